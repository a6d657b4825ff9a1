// Runtime configuration.
// Backend location and data directory, taken from the environment with sane defaults.

use std::path::PathBuf;

use crate::error::{DeckError, Result};
use crate::storage;

/// Backend address used when `VIEWDECK_API_URL` is unset.
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8080";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the backend's REST API.
    pub api_url: String,
    /// Directory for views and preferences. None means the platform default.
    pub data_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: None,
        }
    }
}

impl Config {
    /// Read `VIEWDECK_API_URL` and `VIEWDECK_DATA_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Self {
            api_url: non_empty("VIEWDECK_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            data_dir: non_empty("VIEWDECK_DATA_DIR").map(PathBuf::from),
        }
    }

    /// Directory holding the JSON documents.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        self.data_dir
            .clone()
            .or_else(storage::data_dir)
            .ok_or_else(|| DeckError::Other("no data directory available".to_string()))
    }

    pub fn views_path(&self) -> Result<PathBuf> {
        Ok(storage::views_path(&self.resolved_data_dir()?))
    }

    pub fn preferences_path(&self) -> Result<PathBuf> {
        Ok(storage::preferences_path(&self.resolved_data_dir()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[]));
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_env_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("VIEWDECK_API_URL", "http://10.0.0.2:9000"),
            ("VIEWDECK_DATA_DIR", "/var/lib/viewdeck"),
        ]));
        assert_eq!(config.api_url, "http://10.0.0.2:9000");
        assert_eq!(
            config.views_path().unwrap(),
            PathBuf::from("/var/lib/viewdeck/views.json")
        );
        assert_eq!(
            config.preferences_path().unwrap(),
            PathBuf::from("/var/lib/viewdeck/preferences.json")
        );
    }

    #[test]
    fn test_blank_values_are_ignored() {
        let config = Config::from_lookup(lookup(&[("VIEWDECK_API_URL", "  ")]));
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }
}
