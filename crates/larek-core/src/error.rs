//! Storefront error types.

use thiserror::Error;

/// Errors that can occur in storefront domain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShopError {
    /// The cart has no lines at the moment an order is built.
    #[error("cart is empty")]
    EmptyCart,

    /// Invalid checkout state transition.
    #[error("Invalid checkout transition from {from} to {to}")]
    InvalidCheckoutTransition { from: String, to: String },

    /// Checkout incomplete.
    #[error("Checkout incomplete: missing {0}")]
    CheckoutIncomplete(String),
}
