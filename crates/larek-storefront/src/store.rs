//! Central storefront state.

use std::cell::RefCell;

use larek_core::cart::{Cart, CartLine};
use larek_core::catalog::CatalogEntry;
use larek_core::ids::ProductId;
use tracing::{debug, warn};

use crate::events::{ShopBus, ShopEvent};

/// Owner of the catalog snapshot and the cart.
///
/// Every mutation emits exactly one change event, after the state is fully
/// updated and no borrow is held, so handlers may read the store freely.
#[derive(Debug)]
pub struct Store {
    bus: ShopBus,
    catalog: RefCell<Vec<CatalogEntry>>,
    cart: RefCell<Cart>,
}

impl Store {
    /// Create an empty store publishing on `bus`.
    pub fn new(bus: ShopBus) -> Self {
        Self {
            bus,
            catalog: RefCell::new(Vec::new()),
            cart: RefCell::new(Cart::new()),
        }
    }

    /// Replace the catalog snapshot and emit `catalog:changed`.
    pub fn set_catalog(&self, entries: Vec<CatalogEntry>) {
        debug!(entries = entries.len(), "catalog replaced");
        *self.catalog.borrow_mut() = entries.clone();
        self.bus.publish(ShopEvent::CatalogChanged(entries));
    }

    pub fn catalog(&self) -> Vec<CatalogEntry> {
        self.catalog.borrow().clone()
    }

    pub fn find_entry(&self, id: &ProductId) -> Option<CatalogEntry> {
        self.catalog.borrow().iter().find(|e| &e.id == id).cloned()
    }

    /// Add an entry to the cart.
    ///
    /// Returns `false` without emitting if the entry is already in the cart
    /// or has no price.
    pub fn add_to_cart(&self, entry: &CatalogEntry) -> bool {
        let Some(line) = CartLine::from_entry(entry) else {
            warn!(product = %entry.id, "ignoring add of priceless product");
            return false;
        };
        let inserted = self.cart.borrow_mut().insert(line);
        if inserted {
            self.emit_cart();
        }
        inserted
    }

    /// Remove a product from the cart.
    ///
    /// Always emits `cart:changed`, even when the id was absent.
    pub fn remove_from_cart(&self, id: &ProductId) -> bool {
        let removed = self.cart.borrow_mut().remove(id);
        self.emit_cart();
        removed
    }

    /// Empty the cart and emit `cart:changed`.
    pub fn clear_cart(&self) {
        self.cart.borrow_mut().clear();
        self.emit_cart();
    }

    pub fn is_in_cart(&self, id: &ProductId) -> bool {
        self.cart.borrow().contains(id)
    }

    /// Ordered snapshot of the cart.
    pub fn cart(&self) -> Vec<CartLine> {
        self.cart.borrow().lines().to_vec()
    }

    /// Product ids in cart order.
    pub fn cart_ids(&self) -> Vec<ProductId> {
        self.cart.borrow().ids()
    }

    pub fn cart_total(&self) -> u64 {
        self.cart.borrow().total()
    }

    pub fn cart_len(&self) -> usize {
        self.cart.borrow().len()
    }

    fn emit_cart(&self) {
        let lines = self.cart();
        self.bus.publish(ShopEvent::CartChanged(lines));
    }
}
