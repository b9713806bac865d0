//! Error types for the infrapulse service

/// Errors that can occur in the infrapulse service
#[derive(Debug, thiserror::Error)]
pub enum InfraPulseError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid check interval '{value}': {reason}")]
    InvalidInterval { value: String, reason: String },

    #[error("Probe error: {0}")]
    Probe(String),

    #[error("Mail error: {0}")]
    Mail(String),
}

/// Result type alias for infrapulse operations
pub type Result<T> = std::result::Result<T, InfraPulseError>;
