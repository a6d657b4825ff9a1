// User preferences for the view toolbar.
// Pinned views and layout mode per page, loaded once and written through on change.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::backend::Scope;
use crate::services::PreferenceStore;

use super::views::ViewId;

/// How a page lays out its subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
}

pub fn pinned_key(scope: Scope) -> String {
    format!("pinned-views:{}", scope)
}

pub fn view_mode_key(scope: Scope) -> String {
    format!("view-mode:{}", scope)
}

/// In-memory copy of the preference keys this crate owns.
pub struct Preferences {
    store: Arc<dyn PreferenceStore>,
    pinned: HashMap<Scope, Vec<ViewId>>,
    view_modes: HashMap<Scope, ViewMode>,
}

impl Preferences {
    /// Read pins and view modes for every scope. Bad values fall back to defaults.
    pub fn load(store: Arc<dyn PreferenceStore>) -> Self {
        let mut pinned = HashMap::new();
        let mut view_modes = HashMap::new();

        for scope in Scope::ALL {
            pinned.insert(scope, read_or_default(store.as_ref(), &pinned_key(scope)));
            view_modes.insert(scope, read_or_default(store.as_ref(), &view_mode_key(scope)));
        }

        Self {
            store,
            pinned,
            view_modes,
        }
    }

    /// Pinned view ids of a scope, in the order they were pinned.
    pub fn pinned(&self, scope: Scope) -> &[ViewId] {
        self.pinned.get(&scope).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_pinned(&self, scope: Scope, id: ViewId) -> bool {
        self.pinned(scope).contains(&id)
    }

    /// Pin or unpin a view. Returns whether it is pinned afterwards.
    pub fn toggle_pin(&mut self, scope: Scope, id: ViewId) -> bool {
        let pins = self.pinned.entry(scope).or_default();
        let now_pinned = if let Some(index) = pins.iter().position(|p| *p == id) {
            pins.remove(index);
            false
        } else {
            pins.push(id);
            true
        };
        self.save_pinned(scope);
        now_pinned
    }

    /// Drop a view from the pinned set. Returns false if it was not pinned.
    pub fn unpin(&mut self, scope: Scope, id: ViewId) -> bool {
        let pins = self.pinned.entry(scope).or_default();
        let before = pins.len();
        pins.retain(|p| *p != id);
        if pins.len() == before {
            return false;
        }
        self.save_pinned(scope);
        true
    }

    pub fn view_mode(&self, scope: Scope) -> ViewMode {
        self.view_modes.get(&scope).copied().unwrap_or_default()
    }

    pub fn set_view_mode(&mut self, scope: Scope, mode: ViewMode) {
        if self.view_modes.insert(scope, mode) == Some(mode) {
            return;
        }
        self.write(&view_mode_key(scope), serde_json::json!(mode));
    }

    fn save_pinned(&self, scope: Scope) {
        self.write(&pinned_key(scope), serde_json::json!(self.pinned(scope)));
    }

    fn write(&self, key: &str, value: serde_json::Value) {
        if let Err(e) = self.store.write(key, value) {
            warn!(key, error = %e, "failed to save preference");
        }
    }
}

fn read_or_default<T: serde::de::DeserializeOwned + Default>(
    store: &dyn PreferenceStore,
    key: &str,
) -> T {
    match store.read(key) {
        Ok(Some(value)) => serde_json::from_value(value).unwrap_or_else(|e| {
            warn!(key, error = %e, "ignoring malformed preference");
            T::default()
        }),
        Ok(None) => T::default(),
        Err(e) => {
            warn!(key, error = %e, "failed to read preference");
            T::default()
        }
    }
}
