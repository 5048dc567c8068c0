use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::tui::app::Mode;
use crate::tui::theme;

pub fn render(frame: &mut Frame, area: Rect, mode: &Mode) {
    let hints: &[(&str, &str)] = match mode {
        Mode::Entry => &[("[Enter]", " get prayer times  "), ("[Esc]", " back")],
        Mode::Submitted => &[
            ("[e]", " change location  "),
            ("[r]", " refresh  "),
            ("[q]", " quit"),
        ],
    };

    let mut spans = Vec::new();
    for (key, label) in hints {
        spans.push(Span::styled(*key, theme::gold()));
        spans.push(Span::styled(*label, theme::dim()));
    }

    let line = Line::from(spans);
    let paragraph = Paragraph::new(line).alignment(Alignment::Center);
    frame.render_widget(paragraph, area);
}
