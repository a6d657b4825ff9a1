// Error types for viewdeck.
// Covers view validation, lookup failures, backend and persistence errors.

use thiserror::Error;

use crate::state::{SubscriptionId, ViewId};

/// Why a proposed view name was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    #[error("View name cannot be empty")]
    Empty,

    #[error("A view named \"{0}\" already exists")]
    Duplicate(String),
}

#[derive(Error, Debug)]
pub enum DeckError {
    #[error("Invalid view name: {0}")]
    Validation(#[from] NameError),

    #[error("View {0} not found")]
    ViewNotFound(ViewId),

    #[error("Subscription {0} not found")]
    SubscriptionNotFound(SubscriptionId),

    #[error("View {0} is the default view and cannot be modified")]
    Protected(ViewId),

    #[error("Backend request error: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Backend { status: u16, body: String },

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("{0}")]
    Other(String),
}

impl DeckError {
    /// Whether this error came from user input rather than a fault.
    pub fn is_validation(&self) -> bool {
        matches!(self, DeckError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, DeckError>;
