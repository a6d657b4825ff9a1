// File-backed preference store.
// One JSON object of preference keys, cached in memory and written through on every change.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::services::PreferenceStore;

use super::store::{read_stored, write_stored};

type Entries = BTreeMap<String, serde_json::Value>;

pub struct JsonPreferenceStore {
    path: PathBuf,
    entries: Mutex<Entries>,
}

impl JsonPreferenceStore {
    /// Open the store, loading existing entries if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let entries = read_stored::<Entries>(&path)?
            .map(|stored| stored.data)
            .unwrap_or_default();
        Ok(Self {
            path,
            entries: Mutex::new(entries),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Entries> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PreferenceStore for JsonPreferenceStore {
    fn read(&self, key: &str) -> Result<Option<serde_json::Value>> {
        Ok(self.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: serde_json::Value) -> Result<()> {
        let mut entries = self.lock();
        entries.insert(key.to_string(), value);
        write_stored(&self.path, &*entries)
    }
}
