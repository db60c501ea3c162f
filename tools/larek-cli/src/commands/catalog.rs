//! Catalog listing.

use anyhow::{Context as _, Result};

use super::CatalogArgs;
use crate::context::Context;
use crate::output::{action_badge, truncate};

/// Run the catalog command.
pub async fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront()?;

    let spinner = ctx.output.spinner("Loading catalog...");
    let loaded = shop.load_catalog().await;
    spinner.finish_and_clear();
    loaded.context("Failed to load catalog")?;

    let cards: Vec<_> = shop
        .catalog()
        .cards()
        .into_iter()
        .filter(|card| !args.purchasable || card.action.is_enabled())
        .collect();

    if ctx.output.is_json() {
        ctx.output.json(&cards);
        return Ok(());
    }

    ctx.output.header(&format!("Catalog ({} products)", cards.len()));
    let widths = [4, 28, 12, 16, 36];
    ctx.output
        .table_row(&["#", "TITLE", "CATEGORY", "PRICE", "ID"], &widths);
    for (i, card) in cards.iter().enumerate() {
        let index = (i + 1).to_string();
        let title = truncate(&card.title, 28);
        ctx.output.table_row(
            &[
                index.as_str(),
                title.as_str(),
                card.category_style.modifier(),
                card.price_label.as_str(),
                card.id.as_str(),
            ],
            &widths,
        );
    }

    if ctx.output.is_verbose() {
        for card in &cards {
            ctx.output
                .debug(&format!("{} -> {}", card.id, action_badge(card.action)));
        }
    }

    Ok(())
}
