pub mod project_form;
pub mod project_list;
pub mod task_form;
pub mod task_list;

use ratatui::prelude::*;

/// Centered overlay area for modal dialogs.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width.saturating_sub(w)) / 2,
        y: area.y + (area.height.saturating_sub(h)) / 2,
        width: w,
        height: h,
    }
}
