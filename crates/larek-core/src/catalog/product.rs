//! Catalog entry and product detail types.

use crate::ids::ProductId;
use crate::price::price_label;
use serde::{Deserialize, Serialize};

/// Description shown when the item endpoint returns none.
pub const NO_DESCRIPTION: &str = "No description";

/// A product as listed in the catalog grid.
///
/// Entries are immutable once fetched. The catalog is replaced wholesale on
/// every fetch rather than patched entry by entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogEntry {
    /// Product identifier.
    pub id: ProductId,
    /// Display title.
    pub title: String,
    /// Image URL (CDN-resolved by the gateway).
    pub image: String,
    /// Price in synapses; `None` means priceless.
    pub price: Option<u64>,
    /// Category label as sent by the server.
    pub category: String,
}

impl CatalogEntry {
    /// Create a new catalog entry.
    pub fn new(
        id: impl Into<ProductId>,
        title: impl Into<String>,
        image: impl Into<String>,
        price: Option<u64>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            image: image.into(),
            price,
            category: category.into(),
        }
    }

    /// Check if the entry can be put in the cart.
    pub fn is_purchasable(&self) -> bool {
        self.price.is_some()
    }

    /// Price formatted for display.
    pub fn price_label(&self) -> String {
        price_label(self.price)
    }
}

/// A product as returned by the item endpoint: an entry plus its description.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductDetail {
    #[serde(flatten)]
    pub entry: CatalogEntry,
    /// Long description; may be empty.
    #[serde(default)]
    pub description: String,
}

impl ProductDetail {
    /// Create a detail record from an entry and description.
    pub fn new(entry: CatalogEntry, description: impl Into<String>) -> Self {
        Self {
            entry,
            description: description.into(),
        }
    }

    /// Description for display, falling back to a placeholder.
    pub fn description_or_placeholder(&self) -> &str {
        if self.description.trim().is_empty() {
            NO_DESCRIPTION
        } else {
            &self.description
        }
    }
}

/// Envelope of the catalog list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogPage<T> {
    /// Total number of items on the server.
    pub total: u64,
    /// Items in this page.
    pub items: Vec<T>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priceless_entry_deserializes_null_price() {
        let json = r#"{
            "id": "b06cde61-912f-4663-9751-09956c0eed67",
            "title": "Mighty mouse",
            "image": "/Asterisk_2.svg",
            "price": null,
            "category": "button"
        }"#;
        let entry: CatalogEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.price, None);
        assert!(!entry.is_purchasable());
        assert_eq!(entry.price_label(), "Priceless");
    }

    #[test]
    fn test_detail_flattens_entry_fields() {
        let json = r#"{
            "id": "1",
            "title": "Pill",
            "image": "/pill.svg",
            "price": 750,
            "category": "soft-skill",
            "description": "Helps you focus."
        }"#;
        let detail: ProductDetail = serde_json::from_str(json).unwrap();
        assert_eq!(detail.entry.id.as_str(), "1");
        assert_eq!(detail.entry.price, Some(750));
        assert_eq!(detail.description_or_placeholder(), "Helps you focus.");
    }

    #[test]
    fn test_detail_without_description_uses_placeholder() {
        let entry = CatalogEntry::new("1", "Pill", "/pill.svg", Some(750), "other");
        let detail = ProductDetail::new(entry, "   ");
        assert_eq!(detail.description_or_placeholder(), NO_DESCRIPTION);
    }

    #[test]
    fn test_catalog_page() {
        let json = r#"{"total": 1, "items": [
            {"id": "1", "title": "Pill", "image": "/pill.svg", "price": 750, "category": "other"}
        ]}"#;
        let page: CatalogPage<CatalogEntry> = serde_json::from_str(json).unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items.len(), 1);
    }
}
