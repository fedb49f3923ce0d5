//! Error types for patchbay-core

use thiserror::Error;

/// Result type alias using patchbay-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in patchbay-core operations.
///
/// Per-patch failures (stale patch, bad field value, unknown action) are
/// not represented here - the sync engine reports those as data inside a
/// [`crate::BatchResult`]. This enum covers infrastructure failures only.
#[derive(Error, Debug)]
pub enum Error {
    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entity not found
    #[error("Entity not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
