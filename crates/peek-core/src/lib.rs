use serde::{Deserialize, Serialize};

// ──────────────────────────────────────────────
// Panel constants
// ──────────────────────────────────────────────

/// Smallest width a panel may be resized to.
pub const MIN_WIDTH: i32 = 300;
/// Smallest height a panel may be resized to.
pub const MIN_HEIGHT: i32 = 200;
/// Minimum gap kept between the panel and every viewport edge.
pub const PADDING: i32 = 20;
/// Thickness of a resize handle zone along the panel border.
pub const HANDLE_SIZE: f32 = 6.0;

/// Storage key of the persisted panel-enabled flag.
pub const PANEL_STATE_KEY: &str = "markdown_preview_panel_enabled";

// ──────────────────────────────────────────────
// Geometry
// ──────────────────────────────────────────────

/// Measured geometry, as a layout query reports it (may be fractional).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x
            && point.x <= self.x + self.width
            && point.y >= self.y
            && point.y <= self.y + self.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Inner size of the host window in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Viewport {
    pub width: i32,
    pub height: i32,
}

impl Viewport {
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Integer position and size of the panel in viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct PanelRect {
    pub top: i32,
    pub left: i32,
    pub width: i32,
    pub height: i32,
}

impl PanelRect {
    pub const fn new(top: i32, left: i32, width: i32, height: i32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    pub fn right(&self) -> i32 {
        self.left.saturating_add(self.width)
    }

    pub fn bottom(&self) -> i32 {
        self.top.saturating_add(self.height)
    }

    /// Round a measured rect to whole pixels. Non-finite components become 0.
    pub fn from_measured(rect: Rect) -> Self {
        fn px(v: f32) -> i32 {
            if v.is_finite() {
                v.round() as i32
            } else {
                0
            }
        }
        Self {
            top: px(rect.y),
            left: px(rect.x),
            width: px(rect.width),
            height: px(rect.height),
        }
    }

    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.left as f32,
            self.top as f32,
            self.width as f32,
            self.height as f32,
        )
    }

    /// True when every size and padding invariant holds for `viewport`.
    pub fn fits(&self, viewport: Viewport) -> bool {
        self.width >= MIN_WIDTH
            && self.height >= MIN_HEIGHT
            && self.top >= PADDING
            && self.left >= PADDING
            && self.bottom() <= viewport.height.saturating_sub(PADDING)
            && self.right() <= viewport.width.saturating_sub(PADDING)
    }
}

// ──────────────────────────────────────────────
// Edges & cursors
// ──────────────────────────────────────────────

/// The edge or corner a resize handle sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Edge {
    N,
    S,
    E,
    W,
    NE,
    NW,
    SE,
    SW,
}

impl Edge {
    pub const ALL: [Edge; 8] = [
        Edge::N,
        Edge::E,
        Edge::S,
        Edge::W,
        Edge::NW,
        Edge::NE,
        Edge::SW,
        Edge::SE,
    ];

    pub fn touches_north(self) -> bool {
        matches!(self, Edge::N | Edge::NE | Edge::NW)
    }

    pub fn touches_south(self) -> bool {
        matches!(self, Edge::S | Edge::SE | Edge::SW)
    }

    pub fn touches_east(self) -> bool {
        matches!(self, Edge::E | Edge::NE | Edge::SE)
    }

    pub fn touches_west(self) -> bool {
        matches!(self, Edge::W | Edge::NW | Edge::SW)
    }

    pub fn is_corner(self) -> bool {
        matches!(self, Edge::NE | Edge::NW | Edge::SE | Edge::SW)
    }

    /// Resize cursor shown while hovering or dragging this handle.
    pub fn cursor(self) -> Cursor {
        match self {
            Edge::N | Edge::S => Cursor::NsResize,
            Edge::E | Edge::W => Cursor::EwResize,
            Edge::NW | Edge::SE => Cursor::NwseResize,
            Edge::NE | Edge::SW => Cursor::NeswResize,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Cursor {
    #[default]
    Default,
    Pointer,
    Grab,
    Grabbing,
    NsResize,
    EwResize,
    NwseResize,
    NeswResize,
}

// ──────────────────────────────────────────────
// Input
// ──────────────────────────────────────────────

/// Pointer events as seen by document-level listeners.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { position: Vec2 },
    /// `pressed` is false when the primary button is no longer held.
    Move { position: Vec2, pressed: bool },
    Up { position: Vec2 },
    /// The pointer left the document; no further events will arrive.
    Leave,
}

/// What a pointer position lands on, relative to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Outside,
    Content,
    /// The header strip, which doubles as the drag handle.
    Header,
    /// A button nested in the header. Never starts a drag.
    HeaderButton,
    Handle(Edge),
}

// ──────────────────────────────────────────────
// Messages
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Markdown,
    Minimize,
    TogglePanelState,
}

/// Messages exchanged between the host page, the preview surface and the popup.
/// The JSON shape is `{"type": "...", ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Message {
    #[serde(rename = "MARKDOWN")]
    Markdown { content: String },
    #[serde(rename = "MINIMIZE")]
    Minimize { minimized: bool },
    #[serde(rename = "TOGGLE_PANEL_STATE")]
    TogglePanelState { enabled: bool },
}

impl Message {
    pub fn kind(&self) -> MessageKind {
        match self {
            Message::Markdown { .. } => MessageKind::Markdown,
            Message::Minimize { .. } => MessageKind::Minimize,
            Message::TogglePanelState { .. } => MessageKind::TogglePanelState,
        }
    }

    /// Decode an inbound value. Anything without a known `type` tag and the
    /// matching fields yields `None`.
    pub fn from_value(value: serde_json::Value) -> Option<Self> {
        serde_json::from_value(value).ok()
    }

    pub fn to_value(&self) -> serde_json::Value {
        match self {
            Message::Markdown { content } => {
                serde_json::json!({ "type": "MARKDOWN", "content": content })
            }
            Message::Minimize { minimized } => {
                serde_json::json!({ "type": "MINIMIZE", "minimized": minimized })
            }
            Message::TogglePanelState { enabled } => {
                serde_json::json!({ "type": "TOGGLE_PANEL_STATE", "enabled": enabled })
            }
        }
    }
}

// ──────────────────────────────────────────────
// Errors
// ──────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("markdown engine failed: {0}")]
    Engine(String),
    #[error("render worker is gone")]
    WorkerGone,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("no storage location available")]
    NoLocation,
    #[error("storage io: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encoding: {0}")]
    Encoding(#[from] serde_json::Error),
}

// ──────────────────────────────────────────────
// Trait: MarkdownEngine
// ──────────────────────────────────────────────

/// Turns Markdown source into HTML for the preview surface.
pub trait MarkdownEngine {
    fn render(&self, text: &str) -> Result<String, RenderError>;
}

// ──────────────────────────────────────────────
// Trait: KeyValueStore
// ──────────────────────────────────────────────

/// Persistent per-user key/value storage that survives reloads.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<serde_json::Value>;
    fn set(&mut self, key: &str, value: serde_json::Value) -> Result<(), StoreError>;
}
