//! Error types for sovereign-gateway

use thiserror::Error;

/// Errors that can occur in the gateway core
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Inspector input was not textual data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Malformed arguments to the routing engine or request pipeline
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Prompt exceeds the configured request size
    #[error("Request size ({size} bytes) exceeds maximum ({limit} bytes)")]
    RequestTooLarge {
        size: usize,
        limit: usize,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audit log write or read failure
    #[error("Audit log error: {0}")]
    Audit(String),

    /// Serialization/deserialization failure
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
