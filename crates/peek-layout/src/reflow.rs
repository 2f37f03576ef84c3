use peek_core::{PanelRect, Rect, Viewport};

use crate::geometry::clamp_rect;

/// Fit a measured panel into a (possibly shrunk) viewport.
///
/// Sizes are capped to the viewport without ever growing and re-floored to
/// the minimums; the position moves only as far as needed to get back inside
/// the padding. Returns `None` when the rounded target equals the rounded
/// current rect, so callers can skip the write entirely.
pub fn reflow(measured: Rect, viewport: Viewport) -> Option<PanelRect> {
    let current = PanelRect::from_measured(measured);
    // clamp_rect only ever shrinks sizes toward the viewport or floors them,
    // so it is exactly the reflow rule on the rounded measurement.
    let target = clamp_rect(current, viewport);
    if target == current {
        None
    } else {
        log::trace!("reflow {:?} -> {:?} for {:?}", current, target, viewport);
        Some(target)
    }
}
