use peek_core::{Cursor, HitTarget, PanelRect, Vec2, Viewport};

use crate::geometry::{sanitize_delta, translate};

/// Snapshot taken when a drag starts on the header.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSession {
    pub start_pointer: Vec2,
    pub start_rect: PanelRect,
}

// ──────────────────────────────────────────────
// DragController: Idle -> Dragging -> Idle
// ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct DragController {
    session: Option<DragSession>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&DragSession> {
        self.session.as_ref()
    }

    /// Start dragging from `pointer`. Only the header starts a drag; a press on
    /// a header button is left to the button.
    pub fn begin(&mut self, pointer: Vec2, start_rect: PanelRect, target: HitTarget) -> bool {
        if target != HitTarget::Header {
            return false;
        }
        log::debug!("drag start at ({}, {}) from {:?}", pointer.x, pointer.y, start_rect);
        self.session = Some(DragSession {
            start_pointer: pointer,
            start_rect,
        });
        true
    }

    /// Rect for the current pointer position, or `None` when idle.
    pub fn drag_to(&self, pointer: Vec2, viewport: Viewport) -> Option<PanelRect> {
        let session = self.session.as_ref()?;
        let dx = sanitize_delta(pointer.x - session.start_pointer.x);
        let dy = sanitize_delta(pointer.y - session.start_pointer.y);
        Some(translate(session.start_rect, dx, dy, viewport))
    }

    /// Finish the drag. Returns false if no drag was active.
    pub fn end(&mut self) -> bool {
        let was_dragging = self.session.take().is_some();
        if was_dragging {
            log::debug!("drag end");
        }
        was_dragging
    }

    /// Cursor of the drag handle itself.
    pub fn handle_cursor(&self) -> Cursor {
        if self.is_dragging() {
            Cursor::Grabbing
        } else {
            Cursor::Grab
        }
    }
}
