//! Error types for the journaling engine.
//!
//! Derivation code (normalizer, streak, distribution, presenter) never
//! returns these: it degrades to safe defaults and logs. Repository and
//! API operations return them as explicit results so callers must check
//! before using the data.

use thiserror::Error;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Rejected user input (empty or oversized content, unknown provider name).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The analysis service was unreachable or returned a failure. Carries
    /// the service-provided detail when the response body had one, else a
    /// generic message. Raw transport errors stay out of user-facing text.
    #[error("Service error: {0}")]
    Remote(String),

    /// Malformed metadata payload. Always recovered at the ingestion
    /// boundary and logged; not surfaced to users.
    #[error("Data format error: {0}")]
    DataFormat(String),

    /// Fetch-by-id miss, or a local mutation aimed at an absent entry.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::DataFormat(err.to_string())
    }
}
