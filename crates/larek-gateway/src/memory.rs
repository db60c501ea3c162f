//! In-process gateway.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use larek_core::catalog::{CatalogEntry, ProductDetail};
use larek_core::checkout::{OrderConfirmation, OrderRequest};
use larek_core::ids::{OrderId, ProductId};
use larek_core::price::sum_prices;
use tracing::debug;

use crate::error::GatewayError;
use crate::Gateway;

#[derive(Debug, Default)]
struct MemoryState {
    orders: Vec<OrderRequest>,
    next_order: u64,
    catalog_failure: Option<GatewayError>,
    order_failures: VecDeque<GatewayError>,
    charged_total: Option<u64>,
}

/// Gateway backed by a fixed product list.
///
/// Orders are checked the way the live API checks them: every item must
/// exist and have a price, and the total must match the sum of the prices.
/// Failures can be injected for tests.
#[derive(Debug)]
pub struct MemoryGateway {
    products: Vec<ProductDetail>,
    state: Mutex<MemoryState>,
}

impl MemoryGateway {
    /// Create a gateway serving the given products.
    pub fn new(products: Vec<ProductDetail>) -> Self {
        Self {
            products,
            state: Mutex::new(MemoryState::default()),
        }
    }

    /// Create a gateway from bare catalog entries with empty descriptions.
    pub fn from_entries(entries: Vec<CatalogEntry>) -> Self {
        Self::new(entries.into_iter().map(|e| ProductDetail::new(e, "")).collect())
    }

    /// A small catalog for offline use.
    pub fn demo() -> Self {
        Self::new(vec![
            ProductDetail::new(
                CatalogEntry::new(
                    "854cef69-976d-4c2a-a18c-2aa45046c390",
                    "+1 hour in a day",
                    "/Subtract.svg",
                    Some(750),
                    "soft-skill",
                ),
                "If you plan to solve every task on the course, take two.",
            ),
            ProductDetail::new(
                CatalogEntry::new(
                    "c101ab44-ed99-4a54-990d-47aa2bb4e7d9",
                    "HEX-lollipop",
                    "/Shell.svg",
                    Some(1450),
                    "other",
                ),
                "Lick it and the right colour code appears in your head.",
            ),
            ProductDetail::new(
                CatalogEntry::new(
                    "b06cde61-912f-4663-9751-09956c0eed67",
                    "Mighty mouse",
                    "/Asterisk_2.svg",
                    None,
                    "other",
                ),
                "Will climb out of any task and bring you along.",
            ),
            ProductDetail::new(
                CatalogEntry::new(
                    "412bcf81-7e75-4e70-bdb9-d3c73c9803b7",
                    "Frontend mask",
                    "/Soft_Flower.svg",
                    Some(1000),
                    "additional",
                ),
                "",
            ),
            ProductDetail::new(
                CatalogEntry::new(
                    "1c521d84-c48d-48fa-8cfb-9d911fa515fd",
                    "Framework for everything",
                    "/Butterfly.svg",
                    Some(2500),
                    "hard-skill",
                ),
                "Wraps whatever you need.",
            ),
        ])
    }

    /// Make the next catalog fetches fail until cleared.
    pub fn fail_catalog(&self, error: GatewayError) {
        self.state().catalog_failure = Some(error);
    }

    /// Let catalog fetches succeed again.
    pub fn restore_catalog(&self) {
        self.state().catalog_failure = None;
    }

    /// Queue a failure for the next order submission.
    pub fn fail_next_order(&self, error: GatewayError) {
        self.state().order_failures.push_back(error);
    }

    /// Confirm future orders with this total instead of the requested one.
    pub fn charge_total(&self, total: u64) {
        self.state().charged_total = Some(total);
    }

    /// Orders accepted so far.
    pub fn orders(&self) -> Vec<OrderRequest> {
        self.state().orders.clone()
    }

    /// Number of orders accepted so far.
    pub fn order_count(&self) -> usize {
        self.state().orders.len()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn find(&self, id: &ProductId) -> Option<&ProductDetail> {
        self.products.iter().find(|p| &p.entry.id == id)
    }

    fn check_order(&self, order: &OrderRequest) -> Result<(), GatewayError> {
        for (name, value) in [
            ("payment", &order.payment),
            ("email", &order.email),
            ("phone", &order.phone),
            ("address", &order.address),
        ] {
            if value.trim().is_empty() {
                return Err(GatewayError::rejected(400, format!("Missing field: {}", name)));
            }
        }
        if order.items.is_empty() {
            return Err(GatewayError::rejected(400, "No items in order"));
        }

        let mut prices = Vec::with_capacity(order.items.len());
        for id in &order.items {
            let product = self
                .find(id)
                .ok_or_else(|| GatewayError::rejected(400, format!("Product {} not found", id)))?;
            let price = product
                .entry
                .price
                .ok_or_else(|| GatewayError::rejected(400, format!("Product {} is not for sale", id)))?;
            prices.push(price);
        }
        if sum_prices(prices) != order.total {
            return Err(GatewayError::rejected(400, "Order total does not match"));
        }
        Ok(())
    }
}

impl Default for MemoryGateway {
    fn default() -> Self {
        Self::demo()
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, GatewayError> {
        if let Some(err) = self.state().catalog_failure.clone() {
            return Err(err);
        }
        Ok(self.products.iter().map(|p| p.entry.clone()).collect())
    }

    async fn fetch_item(&self, id: &ProductId) -> Result<ProductDetail, GatewayError> {
        self.find(id)
            .cloned()
            .ok_or_else(|| GatewayError::rejected(404, "Product not found"))
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        if let Some(err) = self.state().order_failures.pop_front() {
            return Err(err);
        }
        self.check_order(order)?;

        let mut state = self.state();
        state.next_order += 1;
        let id = OrderId::new(format!("order-{}", state.next_order));
        let total = state.charged_total.unwrap_or(order.total);
        state.orders.push(order.clone());
        debug!(order = %id, total, "order accepted");
        Ok(OrderConfirmation { id, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn order(items: &[&str], total: u64) -> OrderRequest {
        OrderRequest {
            payment: "card".to_string(),
            email: "a@b.com".to_string(),
            phone: "+7 999 000 00 00".to_string(),
            address: "Main St".to_string(),
            total,
            items: items.iter().map(|id| ProductId::new(*id)).collect(),
        }
    }

    fn gateway() -> MemoryGateway {
        MemoryGateway::from_entries(vec![
            CatalogEntry::new("1", "Pill", "/pill.svg", Some(100), "soft-skill"),
            CatalogEntry::new("2", "Lollipop", "/hex.svg", Some(250), "other"),
            CatalogEntry::new("3", "Mouse", "/mouse.svg", None, "other"),
        ])
    }

    #[tokio::test]
    async fn test_catalog_and_item() {
        let gw = gateway();
        assert_eq!(gw.fetch_catalog().await.unwrap().len(), 3);

        let item = gw.fetch_item(&ProductId::new("2")).await.unwrap();
        assert_eq!(item.entry.title, "Lollipop");

        let missing = gw.fetch_item(&ProductId::new("9")).await.unwrap_err();
        assert_eq!(missing.status(), Some(404));
    }

    #[tokio::test]
    async fn test_accepts_valid_order() {
        let gw = gateway();
        let confirmation = gw.submit_order(&order(&["1", "2"], 350)).await.unwrap();
        assert_eq!(confirmation.id, OrderId::new("order-1"));
        assert_eq!(confirmation.total, 350);
        assert_eq!(gw.order_count(), 1);
    }

    #[tokio::test]
    async fn test_rejects_bad_orders() {
        let gw = gateway();

        let err = gw.submit_order(&order(&["1"], 999)).await.unwrap_err();
        assert_eq!(err.to_string(), "Order total does not match");

        let err = gw.submit_order(&order(&["3"], 0)).await.unwrap_err();
        assert_eq!(err.to_string(), "Product 3 is not for sale");

        let err = gw.submit_order(&order(&["7"], 0)).await.unwrap_err();
        assert_eq!(err.to_string(), "Product 7 not found");

        let err = gw.submit_order(&order(&[], 0)).await.unwrap_err();
        assert_eq!(err.to_string(), "No items in order");

        assert_eq!(gw.order_count(), 0);
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let gw = gateway();
        gw.fail_catalog(GatewayError::Connection("offline".into()));
        assert!(gw.fetch_catalog().await.is_err());
        gw.restore_catalog();
        assert!(gw.fetch_catalog().await.is_ok());

        gw.fail_next_order(GatewayError::rejected(500, "Server is busy"));
        let err = gw.submit_order(&order(&["1"], 100)).await.unwrap_err();
        assert_eq!(err.to_string(), "Server is busy");
        assert!(gw.submit_order(&order(&["1"], 100)).await.is_ok());
    }

    #[tokio::test]
    async fn test_charged_total_override() {
        let gw = gateway();
        gw.charge_total(90);
        let confirmation = gw.submit_order(&order(&["1"], 100)).await.unwrap();
        assert!(!confirmation.matches_total(100));
    }
}
