//! Error types for Tunegrab.

use thiserror::Error;

/// Library-level error type for Tunegrab operations.
#[derive(Error, Debug)]
pub enum TunegrabError {
    #[error("Configuration error: {0}")]
    Config(String),

    /// The inference collaborator could not be reached or refused the call.
    #[error("Inference call failed: {0}")]
    Inference(String),

    /// The collaborator answered, but the payload is not a valid record shape.
    #[error("Schema violation: {0}")]
    Schema(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Session store error: {0}")]
    SessionStore(String),

    #[error("Conversion job not found: {0}")]
    JobNotFound(String),

    #[error("OpenAI API error: {0}")]
    OpenAI(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Result type alias for Tunegrab operations.
pub type Result<T> = std::result::Result<T, TunegrabError>;
