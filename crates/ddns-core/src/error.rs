//! Error types for the DDNS system
//!
//! Cycle failures fall into three classes: transport failures, undecodable
//! responses and provider-side rejections of an update. Configuration errors
//! are raised before anything is scheduled.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration errors (missing or malformed startup parameters)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport failures: connect errors, timeouts, unexpected HTTP status
    #[error("Network error: {0}")]
    Network(String),

    /// A response body that could not be interpreted
    #[error("Decode error: {0}")]
    Decode(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Provider-specific error
    #[error("Provider error ({provider}): {message}")]
    Provider {
        /// Provider name
        provider: String,
        /// Error message
        message: String,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create a provider-specific error
    pub fn provider(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Whether this error came from the transport layer
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Whether this error came from an unreadable response
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Json(_))
    }
}
