use peek_core::{Edge, PanelRect, Rect, Vec2, Viewport};

use crate::geometry::{resize_from_edge, sanitize_delta};

/// Snapshot taken when a resize handle is pressed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeSession {
    pub edge: Edge,
    pub start_pointer: Vec2,
    pub start_rect: PanelRect,
}

// ──────────────────────────────────────────────
// ResizeController: Idle -> Resizing(edge) -> Idle
// ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct ResizeController {
    session: Option<ResizeSession>,
}

impl ResizeController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_resizing(&self) -> bool {
        self.session.is_some()
    }

    pub fn edge(&self) -> Option<Edge> {
        self.session.map(|s| s.edge)
    }

    pub fn session(&self) -> Option<&ResizeSession> {
        self.session.as_ref()
    }

    /// Start resizing from `edge`. `measured` is the panel geometry as laid
    /// out right now, which may be fractional.
    pub fn begin(&mut self, edge: Edge, pointer: Vec2, measured: Rect) {
        let start_rect = PanelRect::from_measured(measured);
        log::debug!("resize start on {:?} from {:?}", edge, start_rect);
        self.session = Some(ResizeSession {
            edge,
            start_pointer: pointer,
            start_rect,
        });
    }

    /// Rect for the current pointer position, or `None` when idle.
    pub fn resize_to(&self, pointer: Vec2, viewport: Viewport) -> Option<PanelRect> {
        let session = self.session.as_ref()?;
        let dx = sanitize_delta(pointer.x - session.start_pointer.x);
        let dy = sanitize_delta(pointer.y - session.start_pointer.y);
        Some(resize_from_edge(session.edge, session.start_rect, dx, dy, viewport))
    }

    /// Finish the resize wherever the pointer is. Returns false if idle.
    pub fn end(&mut self) -> bool {
        match self.session.take() {
            Some(session) => {
                log::debug!("resize end on {:?}", session.edge);
                true
            }
            None => false,
        }
    }
}
