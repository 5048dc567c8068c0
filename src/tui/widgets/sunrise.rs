use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph},
    Frame,
};

use crate::tui::theme;
use crate::utils::format::display_time;

pub fn render(frame: &mut Frame, area: Rect, sunrise: Option<&str>) {
    let block = Block::default()
        .title(Span::styled(" Sunrise ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(crate::tui::theme::BORDER))
        .style(theme::surface());

    let text = sunrise
        .map(display_time)
        .unwrap_or_else(|| "N/A".to_string());

    let paragraph = Paragraph::new(Line::from(vec![
        Span::styled("  ☀ ", theme::amber()),
        Span::styled(text, theme::bold()),
    ]))
    .block(block);
    frame.render_widget(paragraph, area);
}
