// Pointer router
// Hit-tests pointer positions against the panel chrome (resize handles,
// header, header button) and turns document-level pointer events into
// gesture actions.


use peek_core::{Cursor, Edge, HitTarget, PointerEvent, Rect, Vec2, HANDLE_SIZE};

/// Height of the header strip that acts as the drag handle.
pub const HEADER_HEIGHT: f32 = 44.0;
/// Side of the square minimize button in the header.
pub const HEADER_BUTTON_SIZE: f32 = 28.0;
/// Inset of the header button from the header's top and right edges.
pub const HEADER_BUTTON_INSET: f32 = 8.0;

// ──────────────────────────────────────────────
// Action types
// ──────────────────────────────────────────────

/// What the host should do in response to a pointer event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    BeginDrag(Vec2),
    BeginResize(Edge, Vec2),
    /// Continue the active gesture.
    Move(Vec2),
    /// End the active gesture, wherever the pointer is.
    End,
    /// The header's minimize button was clicked.
    Minimize,
    None,
}

// ──────────────────────────────────────────────
// Router
// ──────────────────────────────────────────────

/// Receives every pointer event of the document (not just those over the
/// panel) so gestures that end outside the panel still resolve.
pub struct Router {
    handle_size: f32,
    header_height: f32,
    /// What the current press landed on, if it landed on the panel.
    pressed: Option<HitTarget>,
}

impl Router {
    pub fn new() -> Self {
        Self {
            handle_size: HANDLE_SIZE,
            header_height: HEADER_HEIGHT,
            pressed: None,
        }
    }

    /// Create a router with a custom handle thickness.
    pub fn with_handle_size(handle_size: f32) -> Self {
        Self {
            handle_size,
            ..Self::new()
        }
    }

    /// Returns true while a press that started on the panel is held.
    pub fn is_pressed(&self) -> bool {
        self.pressed.is_some()
    }

    /// Forget the current press without producing an action.
    pub fn reset(&mut self) {
        self.pressed = None;
    }

    /// Rect of the minimize button inside the header.
    pub fn header_button_rect(&self, panel: Rect) -> Rect {
        Rect::new(
            panel.x + panel.width - HEADER_BUTTON_INSET - HEADER_BUTTON_SIZE,
            panel.y + HEADER_BUTTON_INSET,
            HEADER_BUTTON_SIZE,
            HEADER_BUTTON_SIZE,
        )
    }

    /// Determine what lies under `position`. Corners win over edges, edges win
    /// over the header.
    pub fn hit_test(&self, position: Vec2, panel: Rect) -> HitTarget {
        if !panel.contains(position) {
            return HitTarget::Outside;
        }
        if let Some(edge) = self.handle_at(position, panel) {
            return HitTarget::Handle(edge);
        }
        if position.y < panel.y + self.header_height {
            if self.header_button_rect(panel).contains(position) {
                return HitTarget::HeaderButton;
            }
            return HitTarget::Header;
        }
        HitTarget::Content
    }

    fn handle_at(&self, position: Vec2, panel: Rect) -> Option<Edge> {
        let hs = self.handle_size;
        let on_left = position.x < panel.x + hs;
        let on_right = position.x > panel.x + panel.width - hs;
        let on_top = position.y < panel.y + hs;
        let on_bottom = position.y > panel.y + panel.height - hs;

        match (on_top, on_bottom, on_left, on_right) {
            (true, _, true, _) => Some(Edge::NW),
            (true, _, _, true) => Some(Edge::NE),
            (_, true, true, _) => Some(Edge::SW),
            (_, true, _, true) => Some(Edge::SE),
            (true, _, _, _) => Some(Edge::N),
            (_, true, _, _) => Some(Edge::S),
            (_, _, true, _) => Some(Edge::W),
            (_, _, _, true) => Some(Edge::E),
            _ => None,
        }
    }

    /// Cursor affordance for a hover position.
    pub fn hover_cursor(&self, position: Vec2, panel: Rect) -> Cursor {
        match self.hit_test(position, panel) {
            HitTarget::Handle(edge) => edge.cursor(),
            HitTarget::Header => Cursor::Grab,
            HitTarget::HeaderButton => Cursor::Pointer,
            HitTarget::Content | HitTarget::Outside => Cursor::Default,
        }
    }

    /// Process a pointer event and return the action to take.
    pub fn process(&mut self, event: PointerEvent, panel: Rect) -> Action {
        match event {
            PointerEvent::Down { position } => self.process_down(position, panel),
            PointerEvent::Move { position, pressed } => self.process_move(position, pressed),
            PointerEvent::Up { position } => self.process_up(position, panel),
            PointerEvent::Leave => self.process_leave(),
        }
    }

    fn process_down(&mut self, position: Vec2, panel: Rect) -> Action {
        let target = self.hit_test(position, panel);
        let previous = self.pressed.take();
        self.pressed = match target {
            HitTarget::Outside => None,
            other => Some(other),
        };
        match target {
            HitTarget::Handle(edge) => Action::BeginResize(edge, position),
            HitTarget::Header => Action::BeginDrag(position),
            HitTarget::HeaderButton | HitTarget::Content | HitTarget::Outside => match previous {
                // A second press means the release of the first was lost.
                Some(HitTarget::Header) | Some(HitTarget::Handle(_)) => {
                    log::debug!("press during live gesture; ending it");
                    Action::End
                }
                _ => Action::None,
            },
        }
    }

    fn process_move(&mut self, position: Vec2, pressed: bool) -> Action {
        match self.pressed {
            Some(HitTarget::Header) | Some(HitTarget::Handle(_)) => {
                if pressed {
                    Action::Move(position)
                } else {
                    // The release happened where we could not see it.
                    log::debug!("pointer released out of band; ending gesture");
                    self.pressed = None;
                    Action::End
                }
            }
            Some(_) if !pressed => {
                self.pressed = None;
                Action::None
            }
            _ => Action::None,
        }
    }

    fn process_up(&mut self, position: Vec2, panel: Rect) -> Action {
        match self.pressed.take() {
            Some(HitTarget::Header) | Some(HitTarget::Handle(_)) => Action::End,
            Some(HitTarget::HeaderButton) => {
                if self.hit_test(position, panel) == HitTarget::HeaderButton {
                    Action::Minimize
                } else {
                    Action::None
                }
            }
            _ => Action::None,
        }
    }

    fn process_leave(&mut self) -> Action {
        match self.pressed.take() {
            Some(HitTarget::Header) | Some(HitTarget::Handle(_)) => Action::End,
            _ => Action::None,
        }
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
