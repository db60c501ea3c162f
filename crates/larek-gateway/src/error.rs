//! Gateway error types.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by a [`Gateway`](crate::Gateway).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The server refused the request and explained why.
    #[error("{message}")]
    Rejected { status: u16, message: String },

    /// Non-success status without a readable error body.
    #[error("HTTP error: {status} for {url}")]
    Http { status: u16, url: String },

    /// The request did not complete in time.
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    /// The server could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The response body did not have the expected shape.
    #[error("Failed to parse response: {0}")]
    Deserialization(String),
}

impl GatewayError {
    /// Build a rejection with a server message.
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            message: message.into(),
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Rejected { status, .. } | Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if retrying the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection(_) => true,
            Self::Rejected { status, .. } | Self::Http { status, .. } => *status >= 500,
            Self::Deserialization(_) => false,
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(e: serde_json::Error) -> Self {
        GatewayError::Deserialization(e.to_string())
    }
}
