// Event loop
// Single-threaded cooperative driver with a virtual clock. Each script event
// runs to completion, then the loop pumps channels, surface loads, finished
// renders, the route notifier and due timers.

use std::time::Duration;

use peek_core::{Cursor, KeyValueStore, PanelRect, PointerEvent, Vec2, Viewport};
use peek_markdown::MarkdownRenderer;
use peek_sync::{LinkState, LocalRuntime, TabId};
use serde::{Deserialize, Serialize};

use crate::host::{BodyStyle, Host};
use crate::panel::RestoreControl;
use crate::popup::Popup;
use crate::settings::load_panel_enabled;
use crate::surface::Surface;

/// The only tab this loop simulates.
const TAB: TabId = 1;
/// Upper bound on pump iterations in `settle`.
const MAX_SETTLE_TURNS: usize = 64;
const RENDER_TIMEOUT: Duration = Duration::from_secs(5);

fn default_pressed() -> bool {
    true
}

// ──────────────────────────────────────────────
// Script events
// ──────────────────────────────────────────────

/// One line of a replay script, e.g. `{"event":"input","value":"# Hi"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// History API navigation (seen by the history hook).
    Navigate { url: String },
    /// Location change nothing announced; only the poll notices it.
    Location { url: String },
    Mutation,
    TextareaAdded { value: String },
    TextareaRemoved,
    Focus,
    Blur,
    Input { value: String },
    PointerDown { x: f32, y: f32 },
    PointerMove {
        x: f32,
        y: f32,
        #[serde(default = "default_pressed")]
        pressed: bool,
    },
    PointerUp { x: f32, y: f32 },
    PointerLeave,
    Viewport { width: i32, height: i32 },
    /// Click on the surface's minimize trigger.
    MinimizeClick,
    /// Click on the floating restore control.
    RestoreClick,
    PopupToggle { enabled: bool },
    /// Advance the virtual clock.
    Tick { ms: u64 },
    /// Wait for in-flight renders and drain every queue.
    Settle,
}

// ──────────────────────────────────────────────
// Snapshot
// ──────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PanelSnapshot {
    pub visible: bool,
    pub rect: PanelRect,
    pub container: PanelRect,
    pub handle_cursor: Cursor,
    pub hover_cursor: Cursor,
}

/// Observable state after a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub clock_ms: u64,
    pub location: String,
    pub viewport: Viewport,
    pub enabled: bool,
    pub textarea_bound: bool,
    pub link: &'static str,
    pub panel: Option<PanelSnapshot>,
    pub restore_control: Option<RestoreControl>,
    pub body: BodyStyle,
    pub preview_html: Option<String>,
    pub popup_checked: bool,
}

// ──────────────────────────────────────────────
// App
// ──────────────────────────────────────────────

pub struct App {
    clock_ms: u64,
    host: Host,
    surface: Option<Surface>,
    runtime: LocalRuntime,
    store: Box<dyn KeyValueStore>,
    popup: Popup,
}

impl App {
    pub fn new(location: &str, viewport: Viewport, store: Box<dyn KeyValueStore>) -> Self {
        let enabled = load_panel_enabled(&*store);
        let mut host = Host::new(location, viewport, enabled, 0);
        host.initialize(0);

        let mut runtime = LocalRuntime::new();
        runtime.register_tab(TAB, host.runtime_target());
        runtime.activate(TAB);

        let popup = Popup::open(&*store);
        Self {
            clock_ms: 0,
            host,
            surface: None,
            runtime,
            store,
            popup,
        }
    }

    pub fn host(&self) -> &Host {
        &self.host
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    pub fn clock_ms(&self) -> u64 {
        self.clock_ms
    }

    /// Run one script event to completion, then pump once.
    pub fn apply(&mut self, event: ScriptEvent) {
        log::debug!("event: {:?}", event);
        match event {
            ScriptEvent::Navigate { url } => self.host.navigate(&url),
            ScriptEvent::Location { url } => self.host.set_location(&url),
            ScriptEvent::Mutation => self.host.dom_mutation(),
            ScriptEvent::TextareaAdded { value } => self.host.textarea_added(&value),
            ScriptEvent::TextareaRemoved => self.host.textarea_removed(),
            ScriptEvent::Focus => self.host.focus_textarea(),
            ScriptEvent::Blur => self.host.blur_textarea(),
            ScriptEvent::Input { value } => self.host.input(&value),
            ScriptEvent::PointerDown { x, y } => self.host.pointer(PointerEvent::Down {
                position: Vec2::new(x, y),
            }),
            ScriptEvent::PointerMove { x, y, pressed } => self.host.pointer(PointerEvent::Move {
                position: Vec2::new(x, y),
                pressed,
            }),
            ScriptEvent::PointerUp { x, y } => self.host.pointer(PointerEvent::Up {
                position: Vec2::new(x, y),
            }),
            ScriptEvent::PointerLeave => self.host.pointer(PointerEvent::Leave),
            ScriptEvent::Viewport { width, height } => {
                self.host.resize_viewport(Viewport::new(width, height))
            }
            ScriptEvent::MinimizeClick => match &self.surface {
                Some(surface) => surface.click_minimize(),
                None => log::debug!("minimize click without a surface"),
            },
            ScriptEvent::RestoreClick => self.host.restore_click(),
            ScriptEvent::PopupToggle { enabled } => {
                self.popup = Popup::open(&*self.store);
                self.popup.toggle(enabled, &mut *self.store, &self.runtime);
            }
            ScriptEvent::Tick { ms } => {
                self.advance(ms);
                return;
            }
            ScriptEvent::Settle => {
                self.settle();
                return;
            }
        }
        self.pump();
    }

    /// One loop turn. Returns true when anything happened.
    pub fn pump(&mut self) -> bool {
        let mut busy = self.host.handle_messages();

        match (self.host.link_state(), self.surface.is_some()) {
            // The frame element exists now; it reports loaded on a later turn.
            (LinkState::Loading, false) => match Surface::load(
                self.host.window_target(),
                MarkdownRenderer::new(),
            ) {
                Ok(surface) => {
                    self.surface = Some(surface);
                    busy = true;
                }
                Err(e) => log::error!("Failed to start preview surface: {}", e),
            },
            (LinkState::Loading, true) => {
                if let Some(surface) = &self.surface {
                    self.host.surface_loaded(surface.target());
                    busy = true;
                }
            }
            (LinkState::NoPanel, true) => {
                self.surface = None;
                busy = true;
            }
            _ => {}
        }

        if let Some(surface) = self.surface.as_mut() {
            busy |= surface.pump();
        }
        busy |= self.host.flush_route(self.clock_ms);
        busy
    }

    /// Advance the virtual clock by `ms`, firing due timers in order.
    pub fn advance(&mut self, ms: u64) {
        let target = self.clock_ms.saturating_add(ms);
        loop {
            let deadline = self.host.next_deadline();
            if deadline > target {
                break;
            }
            self.clock_ms = deadline.max(self.clock_ms);
            self.host.on_timer(self.clock_ms);
            self.pump();
        }
        self.clock_ms = target;
        self.pump();
    }

    /// Pump until quiet, waiting for in-flight renders.
    pub fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_TURNS {
            let busy = self.pump();
            let rendering = self
                .surface
                .as_ref()
                .is_some_and(|s| s.renders_in_flight() > 0);
            if rendering {
                if let Some(surface) = self.surface.as_mut() {
                    surface.settle(RENDER_TIMEOUT);
                }
                continue;
            }
            if !busy && self.host.link_state() != LinkState::Loading {
                return;
            }
        }
        log::warn!("event loop did not settle after {} turns", MAX_SETTLE_TURNS);
    }

    pub fn snapshot(&self) -> Snapshot {
        let panels = self.host.panels();
        Snapshot {
            clock_ms: self.clock_ms,
            location: self.host.location().to_string(),
            viewport: self.host.viewport(),
            enabled: panels.is_enabled(),
            textarea_bound: self.host.is_textarea_bound(),
            link: match self.host.link_state() {
                LinkState::NoPanel => "no_panel",
                LinkState::Loading => "loading",
                LinkState::Ready => "ready",
            },
            panel: panels.panel().map(|p| PanelSnapshot {
                visible: p.is_visible(),
                rect: p.rect(),
                container: p.container(),
                handle_cursor: p.feedback().handle_cursor,
                hover_cursor: p.hover_cursor(),
            }),
            restore_control: panels.restore_control(),
            body: self.host.body(),
            preview_html: self.surface.as_ref().map(|s| s.mount_html().to_string()),
            popup_checked: self.popup.is_checked(),
        }
    }
}
