use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, List, ListItem},
    Frame,
};

use crate::models::{PrayerName, PrayerSchedule};
use crate::tui::theme;
use crate::utils::format::display_time;

pub fn render(
    frame: &mut Frame,
    area: Rect,
    schedule: Option<&PrayerSchedule>,
    highlighted: Option<PrayerName>,
    loading: bool,
) {
    let title = match schedule.and_then(|s| s.date_for()) {
        Some(date) => format!(" Prayers · {} ", date),
        None => " Prayers ".to_string(),
    };
    let block = Block::default()
        .title(Span::styled(title, theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(crate::tui::theme::BORDER))
        .style(theme::surface());

    let Some(schedule) = schedule else {
        let message = if loading {
            "  Loading…"
        } else {
            "  No prayer times available."
        };
        let list = List::new(vec![
            ListItem::new(Line::from("")),
            ListItem::new(Line::from(Span::styled(message, theme::dim()))),
        ])
        .block(block);
        frame.render_widget(list, area);
        return;
    };

    let items: Vec<ListItem> = schedule
        .entries()
        .iter()
        .map(|entry| {
            let is_next = highlighted == Some(entry.name);

            let (marker, name_style, time_style) = if is_next {
                (
                    "▶ ",
                    theme::gold().add_modifier(Modifier::BOLD),
                    theme::amber().add_modifier(Modifier::BOLD),
                )
            } else {
                ("  ", theme::bold(), theme::dim())
            };

            let line = Line::from(vec![
                Span::styled(format!("  {}", marker), theme::gold()),
                Span::styled(format!("{:<9}", entry.name.display_name()), name_style),
                Span::styled(display_time(&entry.time), time_style),
            ]);

            ListItem::new(line)
        })
        .collect();

    let list = List::new(items).block(block);
    frame.render_widget(list, area);
}
