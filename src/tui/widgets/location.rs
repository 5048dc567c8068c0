use ratatui::{
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::theme;

/// Location form. Drawn as a popup over whatever is already on screen.
pub fn render_form(frame: &mut Frame, area: Rect, input: &str) {
    frame.render_widget(Clear, area);

    // two border columns, the "  › " prompt and the block cursor
    let field_width = (area.width as usize).saturating_sub(7);
    let visible = fit_tail(input, field_width);

    let text = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled("  › ", theme::dim()),
            Span::styled(visible, theme::gold().add_modifier(Modifier::BOLD)),
            Span::styled("█", theme::amber()),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  e.g. Mumbai, London, New York",
            theme::dim(),
        )),
    ];

    let block = Block::default()
        .title(Span::styled(" Enter your location ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(theme::amber())
        .style(theme::surface());

    frame.render_widget(Paragraph::new(text).block(block), area);
}

/// The "📍 Mumbai" line shown once a location has been submitted.
pub fn render_pin(frame: &mut Frame, area: Rect, location: &str, loading: bool) {
    let mut spans = vec![
        Span::styled("  📍 ", theme::red()),
        Span::styled(location, theme::bold()),
    ];
    if loading {
        spans.push(Span::styled("  loading…", theme::dim()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// The longest suffix of `s` that fits in `width` terminal columns, so the
/// cursor end of a long input stays visible.
fn fit_tail(s: &str, width: usize) -> &str {
    if s.width() <= width {
        return s;
    }
    let mut used = 0;
    let mut start = s.len();
    for (idx, ch) in s.char_indices().rev() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &s[start..]
}
