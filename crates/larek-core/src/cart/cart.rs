//! Cart and cart line types.

use crate::catalog::CatalogEntry;
use crate::ids::ProductId;
use crate::price::sum_prices;
use serde::{Deserialize, Serialize};

/// A product in the cart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CartLine {
    /// Product identifier.
    pub id: ProductId,
    /// Product title (denormalized for display).
    pub title: String,
    /// Price in synapses.
    pub price: u64,
    /// Category label.
    pub category: String,
}

impl CartLine {
    /// Build a line from a catalog entry.
    ///
    /// Returns `None` for priceless entries, which can never be bought.
    pub fn from_entry(entry: &CatalogEntry) -> Option<Self> {
        entry.price.map(|price| Self {
            id: entry.id.clone(),
            title: entry.title.clone(),
            price,
            category: entry.category.clone(),
        })
    }
}

/// An id-keyed set of cart lines.
///
/// Holds at most one line per product id. Insertion order is preserved so
/// the cart panel lists lines in the order they were added.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    /// Create an empty cart.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a line unless one with the same id is already present.
    ///
    /// Returns `true` if the line was added.
    pub fn insert(&mut self, line: CartLine) -> bool {
        if self.contains(&line.id) {
            return false;
        }
        self.lines.push(line);
        true
    }

    /// Remove the line with the given id.
    ///
    /// Returns `true` if a line was removed.
    pub fn remove(&mut self, id: &ProductId) -> bool {
        let len_before = self.lines.len();
        self.lines.retain(|l| &l.id != id);
        self.lines.len() < len_before
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Check if a product is in the cart.
    pub fn contains(&self, id: &ProductId) -> bool {
        self.lines.iter().any(|l| &l.id == id)
    }

    /// Lines in insertion order.
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    /// Product ids in insertion order.
    pub fn ids(&self) -> Vec<ProductId> {
        self.lines.iter().map(|l| l.id.clone()).collect()
    }

    /// Sum of line prices; 0 for an empty cart.
    pub fn total(&self) -> u64 {
        sum_prices(self.lines.iter().map(|l| l.price))
    }

    /// Number of lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, price: u64) -> CartLine {
        CartLine {
            id: ProductId::new(id),
            title: format!("Product {}", id),
            price,
            category: "other".to_string(),
        }
    }

    #[test]
    fn test_cart_creation() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn test_insert_same_id_is_noop() {
        let mut cart = Cart::new();
        assert!(cart.insert(line("1", 100)));
        assert!(!cart.insert(line("1", 100)));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_insertion_order_preserved() {
        let mut cart = Cart::new();
        cart.insert(line("b", 1));
        cart.insert(line("a", 2));
        cart.insert(line("c", 3));
        cart.remove(&ProductId::new("a"));
        cart.insert(line("a", 2));

        let ids: Vec<_> = cart.ids().into_iter().map(|i| i.into_inner()).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_remove_absent_id() {
        let mut cart = Cart::new();
        cart.insert(line("1", 100));
        assert!(!cart.remove(&ProductId::new("2")));
        assert_eq!(cart.len(), 1);
    }

    #[test]
    fn test_total_tracks_lines() {
        let mut cart = Cart::new();
        cart.insert(line("1", 100));
        cart.insert(line("2", 2500));
        assert_eq!(cart.total(), 2600);

        cart.remove(&ProductId::new("1"));
        assert_eq!(cart.total(), 2500);

        cart.clear();
        assert_eq!(cart.total(), 0);
    }

    #[test]
    fn test_priceless_entry_has_no_line() {
        let entry = CatalogEntry::new("2", "Mighty mouse", "/mouse.svg", None, "button");
        assert!(CartLine::from_entry(&entry).is_none());

        let entry = CatalogEntry::new("1", "Pill", "/pill.svg", Some(100), "other");
        assert_eq!(CartLine::from_entry(&entry).unwrap().price, 100);
    }
}
