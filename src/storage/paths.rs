// Storage path utilities.
// Resolves where view and preference documents live on disk.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;

/// Platform data directory (~/.local/share/viewdeck on Linux).
pub fn data_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "viewdeck").map(|dirs| dirs.data_dir().to_path_buf())
}

/// Path to the views document inside a data directory.
pub fn views_path(dir: &Path) -> PathBuf {
    dir.join("views.json")
}

/// Path to the preferences document inside a data directory.
pub fn preferences_path(dir: &Path) -> PathBuf {
    dir.join("preferences.json")
}
