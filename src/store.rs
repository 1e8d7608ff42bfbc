//! Key-value access to the persisted settings file.
//!
//! Everything the shell persists (window geometry, home URL, switch behavior)
//! goes through [`KeyValueStore`] so the window logic can be exercised against
//! an in-memory store in tests.

use serde_json::Value;
use tauri::Runtime;

use crate::error::ShellError;

/// Settings file managed by `tauri-plugin-store`, relative to the app data dir.
pub const STORE_FILE: &str = "settings.json";

pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
    fn save(&self) -> Result<(), ShellError>;
}

impl<R: Runtime> KeyValueStore for tauri_plugin_store::Store<R> {
    fn get(&self, key: &str) -> Option<Value> {
        tauri_plugin_store::Store::get(self, key)
    }

    fn set(&self, key: &str, value: Value) {
        tauri_plugin_store::Store::set(self, key.to_string(), value);
    }

    fn save(&self) -> Result<(), ShellError> {
        tauri_plugin_store::Store::save(self)?;
        Ok(())
    }
}

/// Helper to read a setting from the store with a default fallback
pub fn get_setting<T: serde::de::DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    default: T,
) -> T {
    store
        .get(key)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or(default)
}

#[cfg(test)]
pub(crate) use memory::MemoryStore;
