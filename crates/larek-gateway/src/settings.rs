//! Gateway connection settings.

use std::time::Duration;

use crate::retry::Backoff;

/// Public API origin used when nothing is configured.
pub const DEFAULT_API_URL: &str = "https://larek-api.nomoreparties.co/api/weblarek";

/// Public CDN origin used when nothing is configured.
pub const DEFAULT_CDN_URL: &str = "https://larek-api.nomoreparties.co/content/weblarek";

/// Settings for [`HttpGateway`](crate::HttpGateway).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewaySettings {
    /// API base URL; endpoint paths are appended to it.
    pub api_url: String,
    /// CDN base URL; relative image paths are appended to it.
    pub cdn_url: String,
    /// Total timeout per request.
    pub timeout: Duration,
    /// Upper bound on retries for idempotent reads.
    pub max_retries: u32,
    /// Delay between retries.
    pub backoff: Backoff,
}

impl GatewaySettings {
    /// Create settings for the given origins with default timeouts.
    pub fn new(api_url: impl Into<String>, cdn_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            cdn_url: cdn_url.into(),
            ..Self::default()
        }
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry ceiling.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            cdn_url: DEFAULT_CDN_URL.to_string(),
            timeout: Duration::from_secs(5),
            max_retries: 1,
            backoff: Backoff::default(),
        }
    }
}
