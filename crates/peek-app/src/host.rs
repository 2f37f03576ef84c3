// Host page controller (content script)
// Watches the route for pull-request pages, binds the description textarea,
// owns the panel and its link to the preview surface, and applies pointer
// input through the router and the panel geometry.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use peek_core::{Cursor, Message, MessageKind, PointerEvent, Viewport};
use peek_input::{Action, Router};
use peek_sync::{Endpoint, LinkState, MarkdownSync, MessageTarget, PanelLink, Subscription};
use serde::Serialize;

use crate::panel::PanelManager;
use crate::route::{is_pull_request_page, RouteObserver, RouteSignal};

/// Delay between textarea lookups while it has not been rendered yet.
pub const TEXTAREA_RETRY_MS: u64 = 1000;

/// The pull-request description textarea as the page currently shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Textarea {
    pub value: String,
    pub focused: bool,
}

/// Inline styles the host mirrors onto `document.body` during gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BodyStyle {
    pub cursor: Cursor,
    pub user_select: bool,
}

impl Default for BodyStyle {
    fn default() -> Self {
        Self {
            cursor: Cursor::Default,
            user_select: true,
        }
    }
}

pub struct Host {
    location: String,
    viewport: Viewport,
    /// What `textarea[name='pull_request[body]']` would find.
    textarea: Option<Textarea>,
    textarea_bound: bool,
    textarea_retry_at: Option<u64>,
    panels: PanelManager,
    link: PanelLink,
    sync: MarkdownSync,
    router: Router,
    route: RouteObserver,
    body: BodyStyle,
    window: Endpoint,
    runtime: Endpoint,
    inbox: Rc<RefCell<VecDeque<Message>>>,
    _subscriptions: Vec<Subscription>,
}

impl Host {
    pub fn new(location: &str, viewport: Viewport, enabled: bool, now_ms: u64) -> Self {
        let (window, _) = Endpoint::new("host-window");
        let (runtime, _) = Endpoint::new("host-runtime");
        let inbox: Rc<RefCell<VecDeque<Message>>> = Rc::new(RefCell::new(VecDeque::new()));

        let forward = |endpoint: &Endpoint, kind: MessageKind| {
            let inbox = inbox.clone();
            endpoint.listen(kind, move |m| inbox.borrow_mut().push_back(m.clone()))
        };
        let subscriptions = vec![
            forward(&window, MessageKind::Minimize),
            forward(&runtime, MessageKind::TogglePanelState),
        ];

        Self {
            location: location.to_string(),
            viewport,
            textarea: None,
            textarea_bound: false,
            textarea_retry_at: None,
            panels: PanelManager::new(enabled),
            link: PanelLink::new(),
            sync: MarkdownSync::new(),
            router: Router::new(),
            route: RouteObserver::new(location, now_ms),
            body: BodyStyle::default(),
            window,
            runtime,
            inbox,
            _subscriptions: subscriptions,
        }
    }

    // ── Accessors ───────────────────────────────

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn panels(&self) -> &PanelManager {
        &self.panels
    }

    pub fn link_state(&self) -> LinkState {
        self.link.state()
    }

    pub fn body(&self) -> BodyStyle {
        self.body
    }

    pub fn is_textarea_bound(&self) -> bool {
        self.textarea_bound
    }

    /// Target for the surface to post into (`window.parent`).
    pub fn window_target(&self) -> MessageTarget {
        self.window.target()
    }

    /// Target the extension runtime delivers tab messages to.
    pub fn runtime_target(&self) -> MessageTarget {
        self.runtime.target()
    }

    // ── Lifecycle ───────────────────────────────

    /// Page load: start on a pull-request page right away.
    pub fn initialize(&mut self, now_ms: u64) {
        if is_pull_request_page(&self.location) {
            self.find_textarea(now_ms);
        }
    }

    fn on_route_change(&mut self, url: &str, now_ms: u64) {
        if is_pull_request_page(url) {
            self.find_textarea(now_ms);
        } else {
            self.cleanup();
        }
    }

    fn find_textarea(&mut self, now_ms: u64) {
        if self.textarea.is_some() {
            if !self.textarea_bound {
                log::info!("description textarea found");
            }
            self.textarea_bound = true;
            self.textarea_retry_at = None;
        } else {
            log::debug!("description textarea not found; retrying");
            self.textarea_retry_at = Some(now_ms + TEXTAREA_RETRY_MS);
        }
    }

    /// Remove the panel and every binding, e.g. after leaving a PR page.
    pub fn cleanup(&mut self) {
        self.panels.destroy();
        self.link.teardown();
        self.sync.cleanup();
        self.router.reset();
        self.body = BodyStyle::default();
        self.textarea_bound = false;
        self.textarea_retry_at = None;
    }

    // ── Timers ──────────────────────────────────

    pub fn next_deadline(&self) -> u64 {
        match self.textarea_retry_at {
            Some(at) => at.min(self.route.next_poll()),
            None => self.route.next_poll(),
        }
    }

    pub fn on_timer(&mut self, now_ms: u64) {
        self.route.poll(now_ms);
        if self.textarea_retry_at.is_some_and(|at| at <= now_ms) {
            self.textarea_retry_at = None;
            if is_pull_request_page(&self.location) {
                self.find_textarea(now_ms);
            }
        }
    }

    /// End of a loop turn: report a route change at most once.
    pub fn flush_route(&mut self, now_ms: u64) -> bool {
        match self.route.flush(&self.location) {
            Some(url) => {
                self.on_route_change(&url, now_ms);
                true
            }
            None => false,
        }
    }

    // ── Page events ─────────────────────────────

    /// Client-side navigation through the history API.
    pub fn navigate(&mut self, url: &str) {
        self.location = url.to_string();
        self.route.notify(RouteSignal::Navigation);
    }

    /// A location change no history hook saw.
    pub fn set_location(&mut self, url: &str) {
        self.location = url.to_string();
    }

    pub fn dom_mutation(&mut self) {
        self.route.notify(RouteSignal::Mutation);
    }

    pub fn textarea_added(&mut self, value: &str) {
        self.textarea = Some(Textarea {
            value: value.to_string(),
            focused: false,
        });
        self.dom_mutation();
    }

    pub fn textarea_removed(&mut self) {
        self.textarea = None;
        self.textarea_bound = false;
        self.sync.cleanup();
        self.dom_mutation();
    }

    /// Focus on the bound textarea: create and show the panel, then push the
    /// current text.
    pub fn focus_textarea(&mut self) {
        if !self.textarea_bound {
            return;
        }
        let Some(textarea) = self.textarea.as_mut() else {
            return;
        };
        textarea.focused = true;
        if !self.panels.is_enabled() {
            return;
        }

        if self.panels.create(self.viewport) {
            self.link.create();
        }
        if self.panels.show() {
            self.relay_visibility();
        }
        let value = self.textarea.as_ref().map(|t| t.value.as_str());
        self.sync.setup(value, &mut self.link);
    }

    pub fn blur_textarea(&mut self) {
        if let Some(textarea) = self.textarea.as_mut() {
            textarea.focused = false;
        }
    }

    pub fn input(&mut self, value: &str) {
        let Some(textarea) = self.textarea.as_mut() else {
            return;
        };
        textarea.value = value.to_string();
        if self.textarea_bound && self.panels.is_enabled() && self.panels.is_visible() {
            self.sync.on_input(value, &mut self.link);
        }
    }

    pub fn resize_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        if let Some(panel) = self.panels.panel_mut() {
            panel.resize_viewport(viewport);
        }
    }

    /// Floating restore control click.
    pub fn restore_click(&mut self) {
        if self.panels.restore() {
            self.relay_visibility();
            self.push_current_text();
        }
    }

    // ── Pointer input ───────────────────────────

    /// Document-level pointer listener.
    pub fn pointer(&mut self, event: PointerEvent) {
        let Some(panel) = self.panels.panel_mut().filter(|p| p.is_visible()) else {
            self.router.reset();
            return;
        };
        let frame = panel.content().to_rect();

        match self.router.process(event, frame) {
            Action::BeginDrag(p) => {
                panel.begin_drag(p);
            }
            Action::BeginResize(edge, p) => panel.begin_resize(edge, p),
            Action::Move(p) => {
                panel.pointer_move(p);
            }
            Action::End => {
                panel.pointer_up();
            }
            Action::Minimize => {
                self.minimize();
                return;
            }
            Action::None => {
                if let PointerEvent::Move { position, .. } = event {
                    let cursor = self.router.hover_cursor(position, frame);
                    panel.set_hover_cursor(cursor);
                }
            }
        }

        let feedback = panel.feedback();
        self.body = BodyStyle {
            cursor: feedback.body_cursor,
            user_select: !feedback.suppress_selection,
        };
    }

    // ── Messages ────────────────────────────────

    /// Dispatch the window and runtime endpoints. Returns true when any
    /// message was handled.
    pub fn handle_messages(&mut self) -> bool {
        let received = self.window.dispatch() + self.runtime.dispatch();
        let queued: Vec<Message> = self.inbox.borrow_mut().drain(..).collect();
        for message in queued {
            match message {
                Message::Minimize { minimized: true } => self.minimize(),
                Message::Minimize { minimized: false } => self.restore_click(),
                Message::TogglePanelState { enabled } => self.set_enabled(enabled),
                Message::Markdown { .. } => {}
            }
        }
        received > 0
    }

    /// The surface finished loading.
    pub fn surface_loaded(&mut self, target: MessageTarget) {
        let flushed = self.link.loaded(target);
        log::debug!("surface loaded; {} buffered message(s) flushed", flushed);
    }

    fn minimize(&mut self) {
        if self.panels.minimize() {
            self.body = BodyStyle::default();
            self.router.reset();
            self.relay_visibility();
        }
    }

    fn set_enabled(&mut self, enabled: bool) {
        if self.panels.set_enabled(enabled) {
            self.relay_visibility();
            if enabled {
                self.push_current_text();
            }
        }
        if !enabled {
            self.body = BodyStyle::default();
            self.router.reset();
        }
    }

    /// Tell the surface whether it is on screen, so it can park renders.
    fn relay_visibility(&mut self) {
        self.link.send(Message::Minimize {
            minimized: !self.panels.is_visible(),
        });
    }

    fn push_current_text(&mut self) {
        if let Some(textarea) = self.textarea.as_ref().filter(|_| self.textarea_bound) {
            self.sync.on_input(&textarea.value, &mut self.link);
        }
    }
}
