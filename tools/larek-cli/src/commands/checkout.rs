//! Scripted checkout.
//!
//! Drives the same engine a UI would: card clicks, the cart panel, both
//! checkout forms, then the order submission.

use anyhow::{anyhow, bail, Context as _, Result};
use chrono::{DateTime, Utc};
use larek_core::ids::ProductId;
use larek_storefront::form::{ADDRESS_FIELD, EMAIL_FIELD, PAYMENT_GROUP, PHONE_FIELD};
use larek_storefront::{
    CardTarget, CompletionOutcome, EffectOutcome, Panel, ShopEvent, Storefront,
};
use serde::Serialize;
use tracing::info;

use super::CheckoutArgs;
use crate::context::Context;

/// What the CLI prints after a confirmed order.
#[derive(Debug, Serialize)]
pub struct Receipt {
    pub order_id: String,
    pub total: u64,
    pub items: Vec<String>,
    pub placed_at: DateTime<Utc>,
}

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let shop = ctx.storefront()?;

    ctx.output.step(1, 4, "Loading catalog");
    shop.load_catalog().await.context("Failed to load catalog")?;

    ctx.output.step(2, 4, "Filling cart");
    for raw in &args.items {
        add_item(&shop, &ProductId::new(raw.as_str()))?;
    }
    shop.bus().publish(ShopEvent::CartOpen);
    if let Some(Panel::Cart(cart)) = shop.modal().content() {
        for line in &cart.lines {
            ctx.output
                .list_item(&format!("{}. {} ({})", line.index, line.title, line.price_label));
        }
        ctx.output.kv("total", &cart.total_label);
    }

    ctx.output.step(3, 4, "Entering order details");
    if !shop.cart().proceed() {
        bail!("Cart is empty");
    }
    submit_order_form(&shop, &args.payment, &args.address)?;
    submit_contacts_form(&shop, &args.email, &args.phone)?;
    if let Some(step) = shop.checkout().step() {
        ctx.output.debug(&format!("Checkout step: {}", step.display_name()));
    }

    ctx.output.step(4, 4, "Submitting order");
    let receipt = complete(&shop, ctx).await?;
    print_receipt(&receipt, ctx);
    Ok(())
}

/// Put a product in the cart the way a card click would.
pub fn add_item(shop: &Storefront, id: &ProductId) -> Result<()> {
    let card = shop
        .catalog()
        .card(id)
        .ok_or_else(|| anyhow!("Unknown product: {}", id))?;
    if !card.action.is_enabled() {
        bail!("{} is priceless and cannot be bought", card.title);
    }
    if !shop.store().is_in_cart(id) {
        shop.catalog().handle_click(id, CardTarget::ActionButton);
    }
    Ok(())
}

/// Fill and submit the payment/address form.
pub fn submit_order_form(shop: &Storefront, payment: &str, address: &str) -> Result<()> {
    let form = shop.checkout().order_form();
    if !form.select(PAYMENT_GROUP, payment) {
        let options = form
            .view()
            .choice_groups
            .iter()
            .find(|g| g.name == PAYMENT_GROUP)
            .map(|g| g.options.join(", "))
            .unwrap_or_default();
        bail!("Unknown payment method '{}' (available: {})", payment, options);
    }
    form.input(ADDRESS_FIELD, address);
    if !form.submit() {
        bail!("{}", form.error_text());
    }
    Ok(())
}

/// Fill and submit the contacts form.
pub fn submit_contacts_form(shop: &Storefront, email: &str, phone: &str) -> Result<()> {
    let form = shop.checkout().contacts_form();
    form.input(EMAIL_FIELD, email);
    form.input(PHONE_FIELD, phone);
    if !form.submit() {
        bail!("{}", form.error_text());
    }
    Ok(())
}

/// Send the queued order and read the result off the modal.
pub async fn complete(shop: &Storefront, ctx: &Context) -> Result<Receipt> {
    let items: Vec<String> = shop
        .store()
        .cart_ids()
        .into_iter()
        .map(ProductId::into_inner)
        .collect();

    let spinner = ctx.output.spinner("Placing order...");
    let outcomes = shop.settle().await;
    spinner.finish_and_clear();
    let confirmed = outcomes.contains(&EffectOutcome::Order(CompletionOutcome::Confirmed));

    match shop.modal().content() {
        Some(Panel::Success(view)) if confirmed => {
            info!(order = %view.order_id, total = view.total, "order placed");
            Ok(Receipt {
                order_id: view.order_id.into_inner(),
                total: view.total,
                items,
                placed_at: Utc::now(),
            })
        }
        Some(Panel::Contacts(view)) if !view.error_text.is_empty() => {
            bail!("Order failed: {}", view.error_text)
        }
        _ => bail!("Order was not confirmed"),
    }
}

pub fn print_receipt(receipt: &Receipt, ctx: &Context) {
    if ctx.output.is_json() {
        ctx.output.json(receipt);
        return;
    }
    ctx.output.success(&format!("Order {} confirmed", receipt.order_id));
    ctx.output.kv("charged", &larek_core::price::amount_label(receipt.total));
    ctx.output.kv("items", &receipt.items.len().to_string());
    ctx.output
        .kv("placed at", &receipt.placed_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
}
