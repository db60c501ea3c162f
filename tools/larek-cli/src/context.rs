//! CLI execution context.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context as _, Result};
use larek_gateway::{Gateway, HttpGateway, MemoryGateway};
use larek_storefront::Storefront;
use tracing::debug;

use crate::config::{ShopConfig, CONFIG_FILE_NAMES};
use crate::output::Output;

/// Execution context for CLI commands.
pub struct Context {
    /// Effective configuration, environment overrides applied.
    pub config: ShopConfig,
    /// File the config came from, if any.
    pub config_path: Option<PathBuf>,
    /// Output handler.
    pub output: Output,
    /// Working directory.
    pub cwd: PathBuf,
    /// Use the in-memory demo gateway instead of the network.
    pub offline: bool,
}

impl Context {
    /// Load context from config file.
    pub fn load(config_path: Option<&str>, output: Output, offline: bool) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current directory")?;

        let (config, config_path) = if let Some(path) = config_path {
            (ShopConfig::load(path)?, Some(PathBuf::from(path)))
        } else {
            match Self::find_config(&cwd) {
                Some((config, path)) => (config, Some(path)),
                None => (ShopConfig::default(), None),
            }
        };

        Ok(Self {
            config: config.with_env_overrides(),
            config_path,
            output,
            cwd,
            offline,
        })
    }

    /// Find config file in directory tree.
    fn find_config(start: &Path) -> Option<(ShopConfig, PathBuf)> {
        let mut current = start.to_path_buf();
        loop {
            for name in CONFIG_FILE_NAMES {
                let config_path = current.join(name);
                if config_path.exists() {
                    if let Ok(config) = ShopConfig::load(config_path.to_str()?) {
                        return Some((config, config_path));
                    }
                }
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    /// Gateway selected by `--offline` and the `[api]` table.
    pub fn gateway(&self) -> Result<Arc<dyn Gateway>> {
        if self.offline {
            debug!("using in-memory demo gateway");
            return Ok(Arc::new(MemoryGateway::demo()));
        }
        let settings = self.config.gateway_settings();
        debug!(api = %settings.api_url, "using HTTP gateway");
        let gateway = HttpGateway::new(settings).context("Failed to create HTTP client")?;
        Ok(Arc::new(gateway))
    }

    /// Build a storefront on the configured gateway.
    pub fn storefront(&self) -> Result<Storefront> {
        Ok(Storefront::with_options(
            self.gateway()?,
            self.config.storefront_options(),
        ))
    }

    /// Resolve a path relative to the working directory.
    pub fn resolve_path(&self, path: &str) -> PathBuf {
        if PathBuf::from(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.cwd.join(path)
        }
    }
}
