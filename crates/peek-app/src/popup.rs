// Toolbar popup: a single checkbox mirroring the persisted enabled flag.

use peek_core::{KeyValueStore, Message};
use peek_sync::RuntimeMessenger;

use crate::settings::{load_panel_enabled, save_panel_enabled};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Popup {
    checked: bool,
}

impl Popup {
    /// Open the popup, initialising the checkbox from the store.
    pub fn open(store: &dyn KeyValueStore) -> Self {
        Self {
            checked: load_panel_enabled(store),
        }
    }

    pub fn is_checked(&self) -> bool {
        self.checked
    }

    /// Checkbox change: persist the flag, then tell the active tab. The tab is
    /// told even when persisting fails so this session still follows the
    /// checkbox.
    pub fn toggle(
        &mut self,
        checked: bool,
        store: &mut dyn KeyValueStore,
        runtime: &dyn RuntimeMessenger,
    ) {
        self.checked = checked;
        save_panel_enabled(store, checked);
        runtime.send_to_active_tab(&Message::TogglePanelState { enabled: checked });
    }
}
