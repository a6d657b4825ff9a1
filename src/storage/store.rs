// JSON document store.
// Reads and atomically writes the small JSON files views and preferences live in.

use std::fs;
use std::io::Write;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::Result;

/// Wrapper for a stored document with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Stored<T> {
    /// The stored document.
    pub data: T,
    /// When the document was last written.
    pub saved_at: DateTime<Utc>,
}

impl<T> Stored<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            saved_at: Utc::now(),
        }
    }
}

/// Read a stored JSON document, or None if the file does not exist.
pub fn read_stored<T: DeserializeOwned>(path: &Path) -> Result<Option<Stored<T>>> {
    if !path.exists() {
        return Ok(None);
    }

    let contents = fs::read_to_string(path)?;
    let stored: Stored<T> = serde_json::from_str(&contents)?;
    Ok(Some(stored))
}

/// Write a JSON document, replacing the previous one atomically.
pub fn write_stored<T: Serialize>(path: &Path, data: &T) -> Result<()> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let stored = Stored::new(data);
    let json = serde_json::to_string_pretty(&stored)?;

    // Write atomically via temp file
    let temp_path = path.with_extension("tmp");
    let mut file = fs::File::create(&temp_path)?;
    file.write_all(json.as_bytes())?;
    file.sync_all()?;
    fs::rename(&temp_path, path)?;

    Ok(())
}
