//! Storefront domain types for Larek.
//!
//! This crate provides the plain data the storefront engine moves around:
//!
//! - **Catalog**: catalog entries, product details, categories
//! - **Cart**: an id-keyed, insertion-ordered set of cart lines
//! - **Checkout**: the multi-step checkout flow and its draft
//! - **Wire records**: order requests and confirmations exchanged with the API
//!
//! # Example
//!
//! ```rust
//! use larek_core::prelude::*;
//!
//! let entry = CatalogEntry::new("1", "Pill of focus", "/pill.svg", Some(750), "soft-skill");
//!
//! let mut cart = Cart::new();
//! cart.insert(CartLine::from_entry(&entry).unwrap());
//! cart.insert(CartLine::from_entry(&entry).unwrap());
//!
//! assert_eq!(cart.len(), 1);
//! assert_eq!(cart.total(), 750);
//! ```

pub mod error;
pub mod ids;
pub mod price;

pub mod cart;
pub mod catalog;
pub mod checkout;

pub use error::ShopError;
pub use ids::*;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::ShopError;
    pub use crate::ids::*;
    pub use crate::price::{price_label, PRICELESS_LABEL};

    // Catalog
    pub use crate::catalog::{CatalogEntry, CatalogPage, Category, ProductDetail};

    // Cart
    pub use crate::cart::{Cart, CartLine};

    // Checkout
    pub use crate::checkout::{
        CheckoutDraft, CheckoutFlow, CheckoutStep, ContactDetails, OrderConfirmation,
        OrderDetails, OrderRequest,
    };
}
