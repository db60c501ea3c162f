//! CLI configuration.

use std::time::Duration;

use anyhow::{Context, Result};
use larek_gateway::{GatewaySettings, DEFAULT_API_URL, DEFAULT_CDN_URL};
use larek_observability::LoggingConfig;
use larek_storefront::{StorefrontOptions, DEFAULT_PAYMENT_OPTIONS};
use serde::{Deserialize, Serialize};

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "LAREK_API_URL";
/// Environment variable overriding `api.cdn_url`.
pub const CDN_URL_ENV: &str = "LAREK_CDN_URL";

/// Config file names searched for, in order.
pub const CONFIG_FILE_NAMES: &[&str] = &["larek.toml", ".larek.toml", "larek.json"];

/// Contents of `larek.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Storefront API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Checkout settings.
    #[serde(default)]
    pub checkout: CheckoutConfig,
}

impl ShopConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }

    /// Save config to a file.
    pub fn save(&self, path: &str) -> Result<()> {
        let content = if path.ends_with(".json") {
            serde_json::to_string_pretty(self)?
        } else {
            toml::to_string_pretty(self)?
        };

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path))
    }

    /// Apply `LAREK_API_URL` / `LAREK_CDN_URL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from a variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(url) = lookup(CDN_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api.cdn_url = url;
        }
        self
    }

    /// Gateway settings derived from the `[api]` table.
    pub fn gateway_settings(&self) -> GatewaySettings {
        GatewaySettings::new(&self.api.base_url, &self.api.cdn_url)
            .with_timeout(Duration::from_millis(self.api.timeout_ms))
            .with_max_retries(self.api.max_retries)
    }

    /// Storefront options derived from the `[checkout]` table.
    pub fn storefront_options(&self) -> StorefrontOptions {
        StorefrontOptions::default().with_payment_options(self.checkout.payment_options.iter().cloned())
    }
}

/// Storefront API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API base URL.
    #[serde(default = "default_api_url")]
    pub base_url: String,

    /// CDN base URL for product images.
    #[serde(default = "default_cdn_url")]
    pub cdn_url: String,

    /// Per-request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Retries for catalog and item reads. Orders are never retried.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_cdn_url() -> String {
    DEFAULT_CDN_URL.to_string()
}

fn default_timeout_ms() -> u64 {
    5000
}

fn default_max_retries() -> u32 {
    1
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_url(),
            cdn_url: default_cdn_url(),
            timeout_ms: default_timeout_ms(),
            max_retries: default_max_retries(),
        }
    }
}

/// Checkout settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutConfig {
    /// Payment methods offered by the payment/address form.
    #[serde(default = "default_payment_options")]
    pub payment_options: Vec<String>,
}

fn default_payment_options() -> Vec<String> {
    DEFAULT_PAYMENT_OPTIONS.iter().map(|s| s.to_string()).collect()
}

impl Default for CheckoutConfig {
    fn default() -> Self {
        Self {
            payment_options: default_payment_options(),
        }
    }
}

/// Generate a default larek.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Larek storefront configuration

[api]
base_url = "{api}"
cdn_url = "{cdn}"
timeout_ms = 5000
max_retries = 1

[logging]
# trace, debug, info, warn, error
level = "info"
# human or json
format = "human"

[checkout]
payment_options = ["card", "cash"]
"#,
        api = DEFAULT_API_URL,
        cdn = DEFAULT_CDN_URL,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use larek_observability::{LogFormat, LogLevel};

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: ShopConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, ShopConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let config: ShopConfig = toml::from_str(
            r#"
            [api]
            timeout_ms = 250

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.timeout_ms, 250);
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, LogLevel::Info);
        assert_eq!(config.checkout.payment_options, vec!["card", "cash"]);
    }

    #[test]
    fn test_env_overrides() {
        let config = ShopConfig::default().with_overrides(|key| match key {
            API_URL_ENV => Some("http://localhost:3000/api".to_string()),
            CDN_URL_ENV => Some("  ".to_string()),
            _ => None,
        });
        assert_eq!(config.api.base_url, "http://localhost:3000/api");
        assert_eq!(config.api.cdn_url, DEFAULT_CDN_URL);
    }

    #[test]
    fn test_gateway_settings() {
        let mut config = ShopConfig::default();
        config.api.timeout_ms = 1500;
        config.api.max_retries = 3;

        let settings = config.gateway_settings();
        assert_eq!(settings.timeout, Duration::from_millis(1500));
        assert_eq!(settings.max_retries, 3);
    }

    #[test]
    fn test_json_config_round_trips_through_file() {
        let dir = std::env::temp_dir().join(format!("larek-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("larek.json");
        let path = path.to_str().unwrap();

        let mut config = ShopConfig::default();
        config.checkout.payment_options = vec!["card".to_string()];
        config.save(path).unwrap();

        assert_eq!(ShopConfig::load(path).unwrap(), config);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
