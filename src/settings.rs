use serde_json::{json, Value};
use url::Url;

use crate::error::ShellError;
use crate::store::{get_setting, KeyValueStore};

pub const HOME_URL_KEY: &str = "homeUrl";
pub const MATCH_GEOMETRY_KEY: &str = "matchGeometryOnSwitch";

pub const DEFAULT_HOME_URL: &str = "https://trello.com/";
pub const DEFAULT_MATCH_GEOMETRY: bool = true;

/// Runtime settings for the shell, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ShellConfig {
    /// Page both profile windows load
    pub home_url: Url,
    /// Copy the outgoing window's frame onto the incoming one when switching
    pub match_geometry_on_switch: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            home_url: default_home_url(),
            match_geometry_on_switch: DEFAULT_MATCH_GEOMETRY,
        }
    }
}

impl ShellConfig {
    /// Falls back to defaults for missing or invalid values.
    pub fn from_store(store: &dyn KeyValueStore) -> Self {
        let raw_url: String = get_setting(store, HOME_URL_KEY, DEFAULT_HOME_URL.to_string());
        let home_url = match parse_home_url(&raw_url) {
            Some(url) => url,
            None => {
                log::warn!("Ignoring invalid home URL setting: {:?}", raw_url);
                default_home_url()
            }
        };

        Self {
            home_url,
            match_geometry_on_switch: get_setting(
                store,
                MATCH_GEOMETRY_KEY,
                DEFAULT_MATCH_GEOMETRY,
            ),
        }
    }
}

fn default_home_url() -> Url {
    Url::parse(DEFAULT_HOME_URL).expect("Default home URL must be valid")
}

/// Only web URLs are loadable as the home page.
fn parse_home_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    matches!(url.scheme(), "http" | "https").then_some(url)
}

/// Seed `settings.json` with defaults for missing/null keys, without
/// overwriting existing values. Returns whether anything was written.
///
/// Window geometry is never seeded: its absence means "use defaults".
pub fn ensure_default_settings(store: &dyn KeyValueStore) -> Result<bool, ShellError> {
    let is_missing = |v: Option<Value>| -> bool { matches!(v, None | Some(Value::Null)) };

    let mut dirty = false;
    let mut set_if_missing = |key: &str, value: Value| {
        if is_missing(store.get(key)) {
            store.set(key, value);
            dirty = true;
        }
    };

    set_if_missing(HOME_URL_KEY, json!(DEFAULT_HOME_URL));
    set_if_missing(MATCH_GEOMETRY_KEY, json!(DEFAULT_MATCH_GEOMETRY));

    if dirty {
        store.save()?;
    }

    Ok(dirty)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_defaults_when_store_empty() {
        let store = MemoryStore::default();
        assert_eq!(ShellConfig::from_store(&store), ShellConfig::default());
    }

    #[test]
    fn test_invalid_home_url_falls_back() {
        let store = MemoryStore::with(&[(HOME_URL_KEY, json!("file:///etc/passwd"))]);
        let config = ShellConfig::from_store(&store);
        assert_eq!(config.home_url.as_str(), DEFAULT_HOME_URL);

        let store = MemoryStore::with(&[(HOME_URL_KEY, json!("not a url"))]);
        assert_eq!(
            ShellConfig::from_store(&store).home_url.as_str(),
            DEFAULT_HOME_URL
        );
    }

    #[test]
    fn test_custom_settings_are_read() {
        let store = MemoryStore::with(&[
            (HOME_URL_KEY, json!(" https://example.com/board ")),
            (MATCH_GEOMETRY_KEY, json!(false)),
        ]);
        let config = ShellConfig::from_store(&store);
        assert_eq!(config.home_url.as_str(), "https://example.com/board");
        assert!(!config.match_geometry_on_switch);
    }

    #[test]
    fn test_seeding_keeps_existing_values() {
        let store = MemoryStore::with(&[(MATCH_GEOMETRY_KEY, json!(false))]);
        assert!(ensure_default_settings(&store).unwrap());
        assert_eq!(store.get(MATCH_GEOMETRY_KEY), Some(json!(false)));
        assert_eq!(store.get(HOME_URL_KEY), Some(json!(DEFAULT_HOME_URL)));
        assert_eq!(store.save_count(), 1);

        // Second pass has nothing to write
        assert!(!ensure_default_settings(&store).unwrap());
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn test_seeding_does_not_touch_window_state() {
        let store = MemoryStore::default();
        ensure_default_settings(&store).unwrap();
        assert_eq!(store.get(crate::window_state::LAST_WINDOW_STATE_KEY), None);
    }
}
