//! Interactive storefront session.

use anyhow::{bail, Context as _, Result};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input, Select};
use larek_storefront::form::{ADDRESS_FIELD, EMAIL_FIELD, PAYMENT_GROUP, PHONE_FIELD};
use larek_storefront::{CardTarget, ModalClick, Panel, Storefront};

use super::checkout::{complete, print_receipt};
use super::ShopArgs;
use crate::context::Context;
use crate::output::{action_badge, card_line};

/// Run the shop command.
pub async fn run(_args: ShopArgs, ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        bail!("The shop command is interactive and cannot be used with --json");
    }

    let shop = ctx.storefront()?;
    let spinner = ctx.output.spinner("Loading catalog...");
    let loaded = shop.load_catalog().await;
    spinner.finish_and_clear();
    loaded.context("Failed to load catalog")?;

    let theme = ColorfulTheme::default();
    loop {
        let menu = [
            "Browse catalog".to_string(),
            format!("View cart ({})", shop.store().cart_len()),
            "Checkout".to_string(),
            "Quit".to_string(),
        ];
        let choice = Select::with_theme(&theme)
            .with_prompt("What next?")
            .items(&menu)
            .default(0)
            .interact()?;

        match choice {
            0 => browse(&shop, ctx, &theme).await?,
            1 => edit_cart(&shop, ctx, &theme)?,
            2 => {
                if checkout(&shop, ctx, &theme).await? {
                    break;
                }
            }
            _ => break,
        }
    }

    Ok(())
}

async fn browse(shop: &Storefront, ctx: &Context, theme: &ColorfulTheme) -> Result<()> {
    let cards = shop.catalog().cards();
    let mut items: Vec<String> = cards.iter().map(card_line).collect();
    items.push("Back".to_string());

    let picked = Select::with_theme(theme)
        .with_prompt("Products")
        .items(&items)
        .default(0)
        .interact()?;
    let Some(card) = cards.get(picked) else {
        return Ok(());
    };

    shop.catalog().handle_click(&card.id, CardTarget::Body);
    shop.settle().await;

    let Some(view) = shop.visible_preview(&card.id) else {
        ctx.output.warn(&format!("Could not load {}", card.title));
        return Ok(());
    };
    ctx.output.header(&view.card.title);
    ctx.output.kv("category", &view.card.category);
    ctx.output.kv("price", &view.card.price_label);
    ctx.output.info(&view.description);

    if view.card.action.is_enabled() {
        let toggle = Confirm::with_theme(theme)
            .with_prompt(format!("{} this product?", view.card.action.label()))
            .default(true)
            .interact()?;
        if toggle {
            shop.preview().click_action();
            if let Some(updated) = shop.visible_preview(&card.id) {
                ctx.output.kv("now", &action_badge(updated.card.action));
            }
        }
    } else {
        ctx.output.warn("This product cannot be bought");
    }

    shop.modal().handle_click(ModalClick::CloseButton);
    Ok(())
}

fn edit_cart(shop: &Storefront, ctx: &Context, theme: &ColorfulTheme) -> Result<()> {
    shop.cart().open();
    loop {
        let Some(Panel::Cart(view)) = shop.modal().content() else {
            break;
        };
        if view.is_empty() {
            ctx.output.info("Your cart is empty");
            break;
        }

        ctx.output.header("Cart");
        let mut items: Vec<String> = view
            .lines
            .iter()
            .map(|line| format!("Remove {}. {} ({})", line.index, line.title, line.price_label))
            .collect();
        items.push(format!("Done (total {})", view.total_label));

        let picked = Select::with_theme(theme)
            .items(&items)
            .default(items.len() - 1)
            .interact()?;
        if picked >= view.lines.len() {
            break;
        }
        shop.cart().remove(picked + 1);
    }
    shop.modal().handle_click(ModalClick::CloseButton);
    Ok(())
}

/// Returns `true` once an order is confirmed.
async fn checkout(shop: &Storefront, ctx: &Context, theme: &ColorfulTheme) -> Result<bool> {
    shop.cart().open();
    if !shop.cart().proceed() {
        ctx.output.warn("Add something to the cart first");
        shop.modal().handle_click(ModalClick::CloseButton);
        return Ok(false);
    }

    let order = shop.checkout().order_form();
    let options = ctx.config.checkout.payment_options.clone();
    if options.is_empty() {
        bail!("No payment options configured in [checkout]");
    }
    loop {
        let picked = Select::with_theme(theme)
            .with_prompt("Payment method")
            .items(&options)
            .default(0)
            .interact()?;
        order.select(PAYMENT_GROUP, &options[picked]);
        let address: String = Input::with_theme(theme)
            .with_prompt("Delivery address")
            .interact_text()?;
        order.input(ADDRESS_FIELD, &address);
        if order.submit() {
            break;
        }
        ctx.output.warn(&order.error_text());
    }

    let contacts = shop.checkout().contacts_form();
    loop {
        let email: String = Input::with_theme(theme).with_prompt("Email").interact_text()?;
        let phone: String = Input::with_theme(theme).with_prompt("Phone").interact_text()?;
        contacts.input(EMAIL_FIELD, &email);
        contacts.input(PHONE_FIELD, &phone);
        if contacts.submit() {
            break;
        }
        ctx.output.warn(&contacts.error_text());
    }

    loop {
        match complete(shop, ctx).await {
            Ok(receipt) => {
                print_receipt(&receipt, ctx);
                shop.modal().handle_click(ModalClick::CloseButton);
                return Ok(true);
            }
            Err(e) => {
                ctx.output.error(&format!("{:#}", e));
                let retry = Confirm::with_theme(theme)
                    .with_prompt("Try again?")
                    .default(true)
                    .interact()?;
                if !retry || !contacts.submit() {
                    shop.modal().handle_click(ModalClick::CloseButton);
                    return Ok(false);
                }
            }
        }
    }
}
