//! Error types for the calorieko_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for calorieko_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// A calculation was given inputs outside its domain
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A series had no usable points
    #[error("Empty series: {0}")]
    EmptySeries(String),

    /// A pending sequencer timer was aborted
    #[error("Sequence cancelled")]
    Cancelled,

    /// Onboarding form was finished in an incomplete state
    #[error("Onboarding error: {0}")]
    Onboarding(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidInput(msg.into())
    }
}
