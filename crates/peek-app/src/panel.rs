// Panel manager: creation, visibility, minimize to the floating restore
// control, and the enabled switch.

use peek_core::{Cursor, Edge, HitTarget, PanelRect, Vec2, Viewport};
use peek_layout::{Feedback, Gesture, PanelGeometry};
use serde::Serialize;

// ──────────────────────────────────────────────
// Panel
// ──────────────────────────────────────────────

/// One injected panel: an outer container frame and the content box inside
/// it. Both track the geometry owner's rect together.
#[derive(Debug)]
pub struct Panel {
    geometry: PanelGeometry,
    container: PanelRect,
    content: PanelRect,
    visible: bool,
    hover_cursor: Cursor,
}

impl Panel {
    fn new(viewport: Viewport) -> Self {
        let geometry = PanelGeometry::new(viewport);
        let rect = geometry.rect();
        log::info!("panel created at {:?}", rect);
        Self {
            geometry,
            container: rect,
            content: rect,
            visible: false,
            hover_cursor: Cursor::Default,
        }
    }

    pub fn rect(&self) -> PanelRect {
        self.geometry.rect()
    }

    pub fn container(&self) -> PanelRect {
        self.container
    }

    pub fn content(&self) -> PanelRect {
        self.content
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn gesture(&self) -> Gesture {
        self.geometry.gesture()
    }

    pub fn feedback(&self) -> Feedback {
        self.geometry.feedback()
    }

    pub fn hover_cursor(&self) -> Cursor {
        self.hover_cursor
    }

    pub fn set_hover_cursor(&mut self, cursor: Cursor) {
        self.hover_cursor = cursor;
    }

    fn apply(&mut self, rect: PanelRect) {
        self.container = rect;
        self.content = rect;
    }

    pub fn begin_drag(&mut self, pointer: Vec2) -> bool {
        self.geometry.begin_drag(pointer, HitTarget::Header)
    }

    /// Start a resize from the content box as currently laid out.
    pub fn begin_resize(&mut self, edge: Edge, pointer: Vec2) {
        self.geometry
            .begin_resize(edge, pointer, self.content.to_rect());
    }

    pub fn pointer_move(&mut self, pointer: Vec2) -> bool {
        match self.geometry.pointer_move(pointer) {
            Some(rect) => {
                self.apply(rect);
                true
            }
            None => false,
        }
    }

    pub fn pointer_up(&mut self) -> bool {
        self.geometry.pointer_up()
    }

    pub fn cancel_gesture(&mut self) -> bool {
        self.geometry.cancel()
    }

    pub fn resize_viewport(&mut self, viewport: Viewport) -> bool {
        match self.geometry.resize_viewport(viewport) {
            Some(rect) => {
                self.apply(rect);
                true
            }
            None => false,
        }
    }
}

// ──────────────────────────────────────────────
// PanelManager
// ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RestoreControl {
    pub visible: bool,
}

#[derive(Debug)]
pub struct PanelManager {
    enabled: bool,
    panel: Option<Panel>,
    restore_control: Option<RestoreControl>,
}

impl PanelManager {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            panel: None,
            restore_control: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn panel(&self) -> Option<&Panel> {
        self.panel.as_ref()
    }

    pub fn panel_mut(&mut self) -> Option<&mut Panel> {
        self.panel.as_mut()
    }

    pub fn restore_control(&self) -> Option<RestoreControl> {
        self.restore_control
    }

    pub fn is_visible(&self) -> bool {
        self.panel.as_ref().is_some_and(|p| p.visible)
    }

    fn set_panel_visible(&mut self, visible: bool) -> bool {
        match self.panel.as_mut() {
            Some(panel) if panel.visible != visible => {
                panel.visible = visible;
                if !visible {
                    // A hidden panel never keeps a gesture alive.
                    panel.cancel_gesture();
                }
                true
            }
            _ => false,
        }
    }

    fn set_control_visible(&mut self, visible: bool) {
        if let Some(control) = self.restore_control.as_mut() {
            control.visible = visible;
        }
    }

    /// Create the panel, hidden, unless one exists. Returns true when created.
    pub fn create(&mut self, viewport: Viewport) -> bool {
        if self.panel.is_some() {
            return false;
        }
        self.panel = Some(Panel::new(viewport));
        true
    }

    /// Show the panel if enabled. Returns true when visibility changed.
    pub fn show(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.set_control_visible(false);
        self.set_panel_visible(true)
    }

    /// Hide the panel and show the restore control, creating the control only
    /// while enabled.
    pub fn minimize(&mut self) -> bool {
        if !self.set_panel_visible(false) {
            return false;
        }
        match self.restore_control.as_mut() {
            Some(control) => control.visible = true,
            None if self.enabled => {
                log::debug!("restore control created");
                self.restore_control = Some(RestoreControl { visible: true });
            }
            None => {}
        }
        true
    }

    /// Restore-control click: hide the control and re-show the panel at its
    /// last rect. A no-op unless the control is showing.
    pub fn restore(&mut self) -> bool {
        if !self.restore_control.is_some_and(|c| c.visible) {
            return false;
        }
        self.set_control_visible(false);
        self.set_panel_visible(true)
    }

    /// Enable or disable the panel. Disabling hides both panel and control.
    /// Returns true when panel visibility changed.
    pub fn set_enabled(&mut self, enabled: bool) -> bool {
        self.enabled = enabled;
        log::info!("panel {}", if enabled { "enabled" } else { "disabled" });
        self.set_control_visible(false);
        self.set_panel_visible(enabled)
    }

    pub fn destroy(&mut self) {
        if self.panel.take().is_some() {
            log::info!("panel removed");
        }
        self.restore_control = None;
    }
}
