// Storage module for local persistence.
// Keeps views, membership and preferences in JSON documents under the data directory.

pub mod paths;
pub mod preferences;
pub mod store;
pub mod views;

pub use paths::{data_dir, preferences_path, views_path};
pub use preferences::JsonPreferenceStore;
pub use store::{Stored, read_stored, write_stored};
pub use views::{ASSET_DEFAULT_VIEW_ID, DEX_DEFAULT_VIEW_ID, FileViewPersistence};
