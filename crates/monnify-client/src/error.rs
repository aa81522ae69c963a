//! Client error types.

use std::time::Duration;

/// Errors that can occur when calling the Monnify API.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed before a response was received.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The processor answered with a non-success status.
    #[error("Monnify API error: {status} {code} - {message}")]
    Upstream {
        /// HTTP status code.
        status: u16,
        /// Processor response code (or the HTTP status when absent).
        code: String,
        /// Processor message.
        message: String,
    },

    /// Obtaining a bearer token failed.
    #[error("token refresh failed: {0}")]
    TokenRefresh(#[source] Box<ClientError>),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The endpoint URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The caller's deadline elapsed.
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

impl ClientError {
    /// HTTP status reported by the processor, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Upstream { status, .. } => Some(*status),
            Self::TokenRefresh(inner) => inner.status(),
            Self::Http(err) => err.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Whether the processor reported that the resource does not exist.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Upstream { status: 404, .. })
    }
}
