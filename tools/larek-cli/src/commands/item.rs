//! Single product view.

use anyhow::{bail, Result};
use larek_core::ids::ProductId;
use larek_storefront::{CardTarget, EffectOutcome};

use super::ItemArgs;
use crate::context::Context;
use crate::output::action_badge;

/// Run the item command.
pub async fn run(args: ItemArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront()?;
    let id = ProductId::new(args.id);

    shop.catalog().handle_click(&id, CardTarget::Body);

    let spinner = ctx.output.spinner("Loading product...");
    let outcomes = shop.settle().await;
    spinner.finish_and_clear();

    if !outcomes.contains(&EffectOutcome::PreviewShown(id.clone())) {
        bail!("Failed to load product {}", id);
    }

    let Some(view) = shop.visible_preview(&id) else {
        bail!("Product {} was not shown", id);
    };

    if ctx.output.is_json() {
        ctx.output.json(&view);
        return Ok(());
    }

    ctx.output.header(&view.card.title);
    ctx.output.kv("id", view.card.id.as_str());
    ctx.output.kv("category", &view.card.category);
    ctx.output.kv("price", &view.card.price_label);
    ctx.output.kv("image", &view.card.image);
    ctx.output.kv("action", &action_badge(view.card.action));
    ctx.output.info(&view.description);

    Ok(())
}
