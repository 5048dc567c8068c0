use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders},
    Frame,
};
use tui_big_text::{BigText, PixelSize};

use crate::tui::theme;
use crate::tui::widgets::centered_rect;

/// Quadrant pixels are 4 columns wide per glyph.
const GLYPH_WIDTH: u16 = 4;
const GLYPH_HEIGHT: u16 = 4;

pub fn render(frame: &mut Frame, area: Rect, time: &str) {
    let block = Block::default()
        .title(Span::styled(" Now ", theme::gold()))
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(ratatui::style::Style::default().fg(crate::tui::theme::BORDER))
        .style(theme::surface());
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let big = BigText::builder()
        .pixel_size(PixelSize::Quadrant)
        .style(theme::gold())
        .lines(vec![Line::from(time.to_string())])
        .build();

    let width = time.chars().count() as u16 * GLYPH_WIDTH;
    frame.render_widget(big, centered_rect(inner, width, GLYPH_HEIGHT));
}
