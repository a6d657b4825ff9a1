// Backend API module.
// Client and types for the local price backend that polls subscribed symbols.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::BackendClient;
pub use types::*;
