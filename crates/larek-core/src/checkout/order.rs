//! Order wire records.

use crate::ids::{OrderId, ProductId};
use serde::{Deserialize, Serialize};

/// Body of the order submission request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderRequest {
    /// Payment method name (e.g. "card").
    pub payment: String,
    /// Customer email.
    pub email: String,
    /// Customer phone.
    pub phone: String,
    /// Delivery address.
    pub address: String,
    /// Client-side sum of the cart prices.
    pub total: u64,
    /// Product ids in cart order.
    pub items: Vec<ProductId>,
}

/// Server response to a successful order submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OrderConfirmation {
    /// Server-assigned order id.
    pub id: OrderId,
    /// Total the server charged.
    pub total: u64,
}

impl OrderConfirmation {
    /// Check whether the server echoed the total the client computed.
    pub fn matches_total(&self, expected: u64) -> bool {
        self.total == expected
    }
}
