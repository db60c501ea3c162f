//! View models drawn by a renderer.
//!
//! These are plain snapshots. Presenters rebuild them from the store on
//! every change; nothing here holds state of its own.

use larek_core::catalog::{CatalogEntry, Category, ProductDetail};
use larek_core::cart::CartLine;
use larek_core::ids::{OrderId, ProductId};
use larek_core::price::{amount_label, PRICELESS_LABEL};
use serde::Serialize;

/// State of a card's action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemAction {
    Add,
    Remove,
    /// The product has no price; the button is disabled.
    Priceless,
}

impl ItemAction {
    /// Derive the action from price and cart membership.
    pub fn derive(entry: &CatalogEntry, in_cart: bool) -> Self {
        if !entry.is_purchasable() {
            ItemAction::Priceless
        } else if in_cart {
            ItemAction::Remove
        } else {
            ItemAction::Add
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ItemAction::Add => "Add",
            ItemAction::Remove => "Remove",
            ItemAction::Priceless => PRICELESS_LABEL,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, ItemAction::Priceless)
    }
}

/// One product card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardView {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub category: String,
    /// Badge style derived from the category label.
    pub category_style: Category,
    pub price_label: String,
    pub action: ItemAction,
}

impl CardView {
    pub fn new(entry: &CatalogEntry, in_cart: bool) -> Self {
        Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            image: entry.image.clone(),
            category: entry.category.clone(),
            category_style: Category::from_label(&entry.category),
            price_label: entry.price_label(),
            action: ItemAction::derive(entry, in_cart),
        }
    }
}

/// Product preview panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewView {
    pub card: CardView,
    pub description: String,
}

impl PreviewView {
    pub fn new(detail: &ProductDetail, in_cart: bool) -> Self {
        Self {
            card: CardView::new(&detail.entry, in_cart),
            description: detail.description_or_placeholder().to_string(),
        }
    }
}

/// One row of the cart panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartLineView {
    /// 1-based position in the cart.
    pub index: usize,
    pub id: ProductId,
    pub title: String,
    pub price_label: String,
}

/// Cart panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: u64,
    pub total_label: String,
    /// Whether the "proceed to checkout" control is enabled.
    pub proceed_enabled: bool,
}

impl CartView {
    pub fn new(lines: &[CartLine], total: u64) -> Self {
        Self {
            lines: lines
                .iter()
                .enumerate()
                .map(|(i, line)| CartLineView {
                    index: i + 1,
                    id: line.id.clone(),
                    title: line.title.clone(),
                    price_label: amount_label(line.price),
                })
                .collect(),
            total,
            total_label: amount_label(total),
            proceed_enabled: !lines.is_empty(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Order confirmation panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuccessView {
    pub order_id: OrderId,
    /// Total charged by the server.
    pub total: u64,
    pub message: String,
}

impl SuccessView {
    pub fn new(order_id: OrderId, total: u64) -> Self {
        Self {
            order_id,
            total,
            message: format!("Charged {}", amount_label(total)),
        }
    }
}
