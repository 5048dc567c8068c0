use ratatui::{
    layout::{Alignment, Rect},
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::app::ClockView;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, place: Option<&str>, clock: &ClockView) {
    let mut title = vec![
        Span::styled("  وقت  ", theme::gold().add_modifier(Modifier::BOLD)),
        Span::styled("waqt", theme::gold()),
    ];
    if let Some(place) = place {
        title.push(Span::styled("  ·  ", theme::dim()));
        title.push(Span::styled(place, theme::bold()));
    }

    let mut date_line = vec![
        Span::styled(clock.day.as_str(), theme::bold()),
        Span::styled("  ·  ", theme::dim()),
        Span::styled(clock.date.as_str(), theme::dim()),
    ];
    if let Some(hijri) = &clock.hijri {
        date_line.push(Span::styled("  ·  ", theme::dim()));
        date_line.push(Span::styled(hijri.as_str(), theme::amber()));
    }

    let text = vec![Line::from(title), Line::from(""), Line::from(date_line)];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::gold().add_modifier(Modifier::BOLD))
        .style(theme::base());

    let paragraph = Paragraph::new(text)
        .block(block)
        .alignment(Alignment::Center);

    frame.render_widget(paragraph, area);
}
