//! `larek`: the Larek storefront in a terminal.
//!
//! `catalog`, `item` and `checkout` are scriptable (`--json`); `shop` is an
//! interactive session driving the same engine.

mod commands;
mod config;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use larek_observability::{init_logging, LogFormat, LogLevel};

use commands::{CatalogArgs, CheckoutArgs, ConfigArgs, ItemArgs, ShopArgs};

/// Larek CLI - Browse the shop and place orders from a terminal
#[derive(Parser)]
#[command(name = "larek")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Use the built-in demo catalog instead of the API
    #[arg(long, global = true)]
    offline: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the catalog
    Catalog(CatalogArgs),

    /// Show a single product
    Item(ItemArgs),

    /// Place an order non-interactively
    Checkout(CheckoutArgs),

    /// Browse and check out interactively
    Shop(ShopArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let output = output::Output::new(cli.verbose, cli.json);

    if let Err(e) = run(cli, output.clone()).await {
        output.error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

async fn run(cli: Cli, output: output::Output) -> Result<()> {
    let ctx = context::Context::load(cli.config.as_deref(), output, cli.offline)?;

    let mut logging = ctx.config.logging.clone();
    if cli.verbose {
        logging = logging.with_level(LogLevel::Debug);
    }
    if cli.json {
        logging = logging.with_format(LogFormat::Json);
    }
    if let Err(e) = init_logging(&logging) {
        ctx.output.warn(&format!("Logging disabled: {}", e));
    }

    match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &ctx).await,
        Commands::Item(args) => commands::item::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Shop(args) => commands::shop::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    }
}
