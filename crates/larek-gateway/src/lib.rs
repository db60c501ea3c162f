//! Gateway to the storefront API.
//!
//! This crate provides:
//! - `Gateway` - Async boundary for catalog reads and order submission
//! - `HttpGateway` - JSON-over-HTTP implementation with retry and timeouts
//! - `MemoryGateway` - In-process implementation for tests and offline use
//! - `Endpoint` / `RetryPolicy` - Per-endpoint retry defaults

mod endpoint;
mod error;
mod http;
mod memory;
mod retry;
mod settings;

pub use endpoint::*;
pub use error::*;
pub use http::*;
pub use memory::*;
pub use retry::*;
pub use settings::*;

use async_trait::async_trait;
use larek_core::catalog::{CatalogEntry, ProductDetail};
use larek_core::checkout::{OrderConfirmation, OrderRequest};
use larek_core::ids::ProductId;

/// Remote catalog and order service.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Fetch the whole catalog.
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, GatewayError>;

    /// Fetch one product with its description.
    async fn fetch_item(&self, id: &ProductId) -> Result<ProductDetail, GatewayError>;

    /// Submit an order. Never retried.
    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, GatewayError>;
}
