//! CLI command implementations.

pub mod catalog;
pub mod checkout;
pub mod config;
pub mod item;
pub mod shop;

use clap::{Args, Subcommand};

/// Arguments for the catalog command.
#[derive(Args)]
pub struct CatalogArgs {
    /// Only list products that can be bought.
    #[arg(long)]
    pub purchasable: bool,
}

/// Arguments for the item command.
#[derive(Args)]
pub struct ItemArgs {
    /// Product id.
    pub id: String,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Product id to put in the cart (repeatable).
    #[arg(short, long = "item", required = true)]
    pub items: Vec<String>,

    /// Payment method.
    #[arg(long, default_value = "card")]
    pub payment: String,

    /// Delivery address.
    #[arg(long)]
    pub address: String,

    /// Contact email.
    #[arg(long)]
    pub email: String,

    /// Contact phone.
    #[arg(long)]
    pub phone: String,
}

/// Arguments for the shop command.
#[derive(Args)]
pub struct ShopArgs {}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration.
    Show,
    /// Create a larek.toml in the current directory.
    Init {
        /// Overwrite an existing file.
        #[arg(short, long)]
        force: bool,
    },
}
