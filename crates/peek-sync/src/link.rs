// Panel link
// The host's view of the channel to its embedded preview surface:
// NoPanel -> Loading -> Ready, back to NoPanel on teardown.

use peek_core::Message;

use crate::bus::MessageTarget;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    NoPanel,
    /// The surface exists but has not finished loading; sends are buffered.
    Loading,
    Ready,
}

#[derive(Debug)]
pub struct PanelLink {
    state: LinkState,
    target: Option<MessageTarget>,
    pending: Vec<Message>,
}

impl PanelLink {
    pub fn new() -> Self {
        Self {
            state: LinkState::NoPanel,
            target: None,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == LinkState::Ready
    }

    pub fn has_panel(&self) -> bool {
        self.state != LinkState::NoPanel
    }

    /// Messages waiting for the surface to load.
    pub fn pending(&self) -> &[Message] {
        &self.pending
    }

    /// Start creating the surface. Returns false if one already exists.
    pub fn create(&mut self) -> bool {
        if self.has_panel() {
            return false;
        }
        log::debug!("panel link: loading");
        self.state = LinkState::Loading;
        true
    }

    /// The surface finished loading and can receive messages through `target`.
    /// Buffered messages are flushed in order. Returns how many were flushed.
    pub fn loaded(&mut self, target: MessageTarget) -> usize {
        match self.state {
            LinkState::NoPanel => {
                log::warn!("panel link: load reported without a panel");
                return 0;
            }
            LinkState::Ready => log::debug!("panel link: {} reloaded", target.name()),
            LinkState::Loading => log::debug!("panel link: {} ready", target.name()),
        }
        self.state = LinkState::Ready;
        let flushed = std::mem::take(&mut self.pending);
        for message in &flushed {
            target.send(message);
        }
        self.target = Some(target);
        flushed.len()
    }

    /// Send to the surface. While loading, a newer message replaces any
    /// buffered one of the same kind, since every message is a full snapshot.
    pub fn send(&mut self, message: Message) {
        match self.state {
            LinkState::Ready => {
                if let Some(target) = &self.target {
                    target.send(&message);
                }
            }
            LinkState::Loading => {
                let kind = message.kind();
                self.pending.retain(|m| m.kind() != kind);
                self.pending.push(message);
            }
            LinkState::NoPanel => {
                log::debug!("panel link: no panel; {:?} dropped", message.kind());
            }
        }
    }

    pub fn teardown(&mut self) {
        if self.has_panel() {
            log::debug!("panel link: torn down");
        }
        self.state = LinkState::NoPanel;
        self.target = None;
        self.pending.clear();
    }
}

impl Default for PanelLink {
    fn default() -> Self {
        Self::new()
    }
}
