//! Error types for the description client.

use thiserror::Error;

/// Result type for description requests.
pub type DescriptionResult<T> = Result<T, DescriptionError>;

/// Errors that can occur while describing a sketch.
#[derive(Debug, Error)]
pub enum DescriptionError {
    /// The configured base URL is malformed.
    #[error("invalid description service URL: {0}")]
    InvalidUrl(String),

    /// The API key variable is not set or is empty.
    #[error("missing API key: set {var}")]
    MissingApiKey {
        /// Name of the environment variable that was consulted.
        var: String,
    },

    /// A configuration value could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// HTTP layer failed (connection, timeout, client build).
    #[error("description request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("description service returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as received.
        body: String,
    },

    /// The service answered with an empty body.
    #[error("description service returned an empty body")]
    EmptyBody,

    /// The request body could not be serialized.
    #[error("failed to encode description request: {0}")]
    Encode(#[from] serde_json::Error),

    /// The body did not contain a description at the expected path.
    #[error("failed to decode description response: {0}")]
    Decode(String),
}

impl DescriptionError {
    /// Whether the failure happened before a usable response arrived.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Network(_) | Self::Status { .. } | Self::EmptyBody)
    }
}
