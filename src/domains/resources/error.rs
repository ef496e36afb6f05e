//! Resource-specific error types.

use thiserror::Error;

use crate::domains::open_data::UnknownCategory;

/// Errors that can occur during resource operations.
#[derive(Debug, Error)]
pub enum ResourceError {
    /// The requested resource was not found.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// The resource content could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ResourceError {
    /// Create a new "not found" error.
    pub fn not_found(uri: impl Into<String>) -> Self {
        Self::NotFound(uri.into())
    }
}

impl From<UnknownCategory> for ResourceError {
    fn from(err: UnknownCategory) -> Self {
        Self::NotFound(err.0)
    }
}
