//! Common error types for pawlink

use thiserror::Error;

/// Common result type for pawlink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the pawlink pipeline
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A field map references a column absent from the source schema.
    /// Fatal: the source configuration must be fixed before any records
    /// can be processed.
    #[error("Invalid field map: {0}")]
    InvalidFieldMap(String),

    /// A row violates basic encoding or shape expectations at the
    /// ingestion boundary. Propagated, never skipped: silently dropping
    /// rows would corrupt identity linkage.
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// The address-expansion boundary errored or returned no candidates.
    /// Callers recover by falling back to the pre-expansion string.
    #[error("Address expansion failed: {0}")]
    Expansion(String),
}
