//! Error types for tonewheel-core.
//!
//! Nothing on the audio path returns these; they only surface while
//! loading configuration or decoding raw host parameters.

use thiserror::Error;

/// Result type alias for tonewheel-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value is outside its accepted range.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration JSON could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Raw host parameter id with no mapping.
    #[error("Unknown parameter id {0}")]
    UnknownParameter(u16),
}
