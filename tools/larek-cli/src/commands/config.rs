//! Configuration management commands.

use anyhow::{bail, Context as _, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::{generate_default_config, API_URL_ENV, CDN_URL_ENV, CONFIG_FILE_NAMES};
use crate::context::Context;

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match &ctx.config_path {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    ctx.output.info("[api]");
    ctx.output.kv("base_url", &ctx.config.api.base_url);
    ctx.output.kv("cdn_url", &ctx.config.api.cdn_url);
    ctx.output.kv("timeout_ms", &ctx.config.api.timeout_ms.to_string());
    ctx.output.kv("max_retries", &ctx.config.api.max_retries.to_string());

    ctx.output.info("[logging]");
    ctx.output.kv("level", ctx.config.logging.level.as_str());
    ctx.output.kv("format", &format!("{:?}", ctx.config.logging.format).to_lowercase());

    ctx.output.info("[checkout]");
    ctx.output
        .kv("payment_options", &ctx.config.checkout.payment_options.join(", "));

    for var in [API_URL_ENV, CDN_URL_ENV] {
        if std::env::var_os(var).is_some() {
            ctx.output.debug(&format!("{} is set and overrides the file", var));
        }
    }

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.resolve_path(CONFIG_FILE_NAMES[0]);

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    std::fs::write(&config_path, generate_default_config())
        .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}
