//! Checkout module.
//!
//! Contains the checkout flow state machine, its draft, and the order wire
//! records.

mod flow;
mod order;

pub use flow::{CheckoutDraft, CheckoutFlow, CheckoutStep, ContactDetails, OrderDetails};
pub use order::{OrderConfirmation, OrderRequest};
