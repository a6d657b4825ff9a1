// viewdeck library root.
// Saved views over tracked subscriptions, with toolbar selection and visibility sync.

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod services;
pub mod state;
pub mod storage;

pub use app::App;
pub use config::Config;
pub use error::{DeckError, Result};
pub use services::Services;
