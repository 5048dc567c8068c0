pub mod clock;
pub mod header;
pub mod location;
pub mod next_prayer;
pub mod prayers;
pub mod statusbar;
pub mod sunrise;

use ratatui::layout::Rect;

/// A `width` x `height` box in the middle of `area`, clamped to fit.
pub fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
