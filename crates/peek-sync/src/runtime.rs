// Extension runtime messaging: the popup reaches the content script of the
// active tab through the runtime, never directly.

use std::collections::HashMap;

use peek_core::Message;

use crate::bus::MessageTarget;

pub type TabId = u32;

pub trait RuntimeMessenger {
    /// Deliver `message` to the active tab's runtime endpoint. Returns false
    /// when there is no active tab to deliver to.
    fn send_to_active_tab(&self, message: &Message) -> bool;
}

/// In-process runtime: a table of tab endpoints and the active tab.
#[derive(Debug, Default)]
pub struct LocalRuntime {
    tabs: HashMap<TabId, MessageTarget>,
    active: Option<TabId>,
}

impl LocalRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the runtime endpoint of a tab's content script.
    pub fn register_tab(&mut self, tab: TabId, target: MessageTarget) {
        self.tabs.insert(tab, target);
    }

    pub fn remove_tab(&mut self, tab: TabId) {
        self.tabs.remove(&tab);
        if self.active == Some(tab) {
            self.active = None;
        }
    }

    /// Make `tab` the active one. Unknown tabs are refused.
    pub fn activate(&mut self, tab: TabId) -> bool {
        if !self.tabs.contains_key(&tab) {
            log::warn!("cannot activate unknown tab {}", tab);
            return false;
        }
        self.active = Some(tab);
        true
    }

    pub fn active_tab(&self) -> Option<TabId> {
        self.active
    }
}

impl RuntimeMessenger for LocalRuntime {
    fn send_to_active_tab(&self, message: &Message) -> bool {
        match self.active.and_then(|tab| self.tabs.get(&tab)) {
            Some(target) => {
                target.send(message);
                true
            }
            None => {
                log::debug!("no active tab; {:?} dropped", message.kind());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bus::Endpoint;
    use peek_core::MessageKind;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn reaches_only_the_active_tab() {
        let (tab1, t1) = Endpoint::new("tab-1");
        let (tab2, t2) = Endpoint::new("tab-2");
        let hits = Rc::new(RefCell::new(Vec::new()));
        let h1 = hits.clone();
        let h2 = hits.clone();
        let _s1 = tab1.listen(MessageKind::TogglePanelState, move |_| h1.borrow_mut().push(1));
        let _s2 = tab2.listen(MessageKind::TogglePanelState, move |_| h2.borrow_mut().push(2));

        let mut runtime = LocalRuntime::new();
        runtime.register_tab(1, t1);
        runtime.register_tab(2, t2);
        assert!(runtime.activate(2));

        let toggle = Message::TogglePanelState { enabled: false };
        assert!(runtime.send_to_active_tab(&toggle));
        tab1.dispatch();
        tab2.dispatch();
        assert_eq!(*hits.borrow(), vec![2]);
    }

    #[test]
    fn no_active_tab_is_a_no_op() {
        let mut runtime = LocalRuntime::new();
        assert!(!runtime.activate(7));
        assert!(!runtime.send_to_active_tab(&Message::TogglePanelState { enabled: true }));

        let (_tab, target) = Endpoint::new("tab-7");
        runtime.register_tab(7, target);
        runtime.activate(7);
        runtime.remove_tab(7);
        assert_eq!(runtime.active_tab(), None);
    }
}
