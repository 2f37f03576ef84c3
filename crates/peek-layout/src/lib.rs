// Panel geometry engine
// Owns the panel rectangle and the two gesture controllers that mutate it.

pub mod drag;
pub mod geometry;
pub mod reflow;
pub mod resize;

use peek_core::{Cursor, Edge, HitTarget, PanelRect, Rect, Vec2, Viewport};

pub use drag::{DragController, DragSession};
pub use geometry::{clamp_rect, initial_rect, resize_from_edge, sanitize_delta, translate};
pub use reflow::reflow;
pub use resize::{ResizeController, ResizeSession};

// ──────────────────────────────────────────────
// Gesture state
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    Idle,
    Dragging,
    Resizing(Edge),
}

/// Visual side effects the host mirrors onto the document while a gesture is
/// live: body cursor, drag handle cursor, and text-selection suppression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feedback {
    pub body_cursor: Cursor,
    pub handle_cursor: Cursor,
    pub suppress_selection: bool,
}

// ──────────────────────────────────────────────
// PanelGeometry
// ──────────────────────────────────────────────

/// Single writer of a panel's rect. Drag and resize sessions are mutually
/// exclusive: starting one ends the other.
#[derive(Debug)]
pub struct PanelGeometry {
    rect: PanelRect,
    viewport: Viewport,
    drag: DragController,
    resize: ResizeController,
}

impl PanelGeometry {
    /// Create geometry for a new panel placed with the default layout.
    pub fn new(viewport: Viewport) -> Self {
        Self::with_rect(initial_rect(viewport), viewport)
    }

    /// Create geometry from an explicit rect, pulled into the viewport.
    pub fn with_rect(rect: PanelRect, viewport: Viewport) -> Self {
        let rect = reflow(rect.to_rect(), viewport).unwrap_or(rect);
        Self {
            rect,
            viewport,
            drag: DragController::new(),
            resize: ResizeController::new(),
        }
    }

    pub fn rect(&self) -> PanelRect {
        self.rect
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn gesture(&self) -> Gesture {
        if let Some(edge) = self.resize.edge() {
            Gesture::Resizing(edge)
        } else if self.drag.is_dragging() {
            Gesture::Dragging
        } else {
            Gesture::Idle
        }
    }

    /// Begin a drag from the header. Any resize in progress is ended first.
    pub fn begin_drag(&mut self, pointer: Vec2, target: HitTarget) -> bool {
        if target != HitTarget::Header {
            return false;
        }
        self.resize.end();
        self.drag.begin(pointer, self.rect, target)
    }

    /// Begin a resize from `edge`, starting at the `measured` layout rect.
    /// Any drag in progress is ended first.
    pub fn begin_resize(&mut self, edge: Edge, pointer: Vec2, measured: Rect) {
        self.drag.end();
        self.resize.begin(edge, pointer, measured);
    }

    /// Apply a pointer move to the active gesture. Returns the new rect when
    /// it changed.
    pub fn pointer_move(&mut self, pointer: Vec2) -> Option<PanelRect> {
        let next = match self.gesture() {
            Gesture::Idle => return None,
            Gesture::Dragging => self.drag.drag_to(pointer, self.viewport)?,
            Gesture::Resizing(_) => self.resize.resize_to(pointer, self.viewport)?,
        };
        if next == self.rect {
            return None;
        }
        log::trace!("panel rect {:?} -> {:?}", self.rect, next);
        self.rect = next;
        Some(next)
    }

    /// End whichever gesture is active. Returns false when idle.
    pub fn pointer_up(&mut self) -> bool {
        let dragged = self.drag.end();
        let resized = self.resize.end();
        dragged || resized
    }

    /// Abandon the active gesture, keeping the rect reached so far.
    pub fn cancel(&mut self) -> bool {
        if self.gesture() != Gesture::Idle {
            log::debug!("gesture cancelled");
        }
        self.pointer_up()
    }

    /// React to a viewport size change. Returns the new rect if a write is needed.
    pub fn resize_viewport(&mut self, viewport: Viewport) -> Option<PanelRect> {
        self.viewport = viewport;
        let next = reflow(self.rect.to_rect(), viewport)?;
        log::debug!("reflow for {}x{}: {:?}", viewport.width, viewport.height, next);
        self.rect = next;
        Some(next)
    }

    pub fn feedback(&self) -> Feedback {
        match self.gesture() {
            Gesture::Idle => Feedback {
                body_cursor: Cursor::Default,
                handle_cursor: self.drag.handle_cursor(),
                suppress_selection: false,
            },
            Gesture::Dragging => Feedback {
                body_cursor: Cursor::Default,
                handle_cursor: self.drag.handle_cursor(),
                suppress_selection: true,
            },
            Gesture::Resizing(edge) => Feedback {
                body_cursor: edge.cursor(),
                handle_cursor: self.drag.handle_cursor(),
                suppress_selection: true,
            },
        }
    }
}
