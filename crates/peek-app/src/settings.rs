// Settings persistence: the extension's synced key/value storage.
// Uses platform-native config dir: e.g. ~/Library/Application Support/peek/storage.json
// on macOS, ~/.config/peek/storage.json on Linux.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use peek_core::{KeyValueStore, StoreError, PANEL_STATE_KEY};
use serde_json::{Map, Value};

fn storage_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("peek").join("storage.json"))
}

// ──────────────────────────────────────────────
// JsonFileStore
// ──────────────────────────────────────────────

/// Key/value store backed by a single JSON object on disk. Every `set`
/// rewrites the file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: Option<PathBuf>,
    values: Map<String, Value>,
}

impl JsonFileStore {
    /// Open the store in the platform config dir. Without a config dir the
    /// store still works but keeps values in memory only.
    pub fn open() -> Self {
        match storage_path() {
            Some(path) => Self::at(path),
            None => {
                log::warn!("Cannot determine storage path; settings will not persist");
                Self {
                    path: None,
                    values: Map::new(),
                }
            }
        }
    }

    /// Open the store at an explicit path. A missing or unreadable file
    /// starts empty.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = load_values(&path);
        Self {
            path: Some(path),
            values,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn persist(&self) -> Result<(), StoreError> {
        let path = self.path.as_ref().ok_or(StoreError::NoLocation)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&self.values)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

fn load_values(path: &Path) -> Map<String, Value> {
    match std::fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str::<Map<String, Value>>(&data) {
            Ok(values) => values,
            Err(e) => {
                log::warn!("Failed to parse {}: {}", path.display(), e);
                Map::new()
            }
        },
        Err(_) => Map::new(),
    }
}

impl KeyValueStore for JsonFileStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        self.persist()
    }
}

// ──────────────────────────────────────────────
// MemoryStore
// ──────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

// ──────────────────────────────────────────────
// Panel enabled flag
// ──────────────────────────────────────────────

/// Anything but an explicit `false` reads as enabled.
pub fn load_panel_enabled(store: &dyn KeyValueStore) -> bool {
    store.get(PANEL_STATE_KEY) != Some(Value::Bool(false))
}

pub fn save_panel_enabled(store: &mut dyn KeyValueStore, enabled: bool) {
    if let Err(e) = store.set(PANEL_STATE_KEY, Value::Bool(enabled)) {
        log::warn!("Failed to save panel state: {}", e);
    }
}
