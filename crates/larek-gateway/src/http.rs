//! JSON-over-HTTP gateway.

use std::time::Duration;

use async_trait::async_trait;
use larek_core::catalog::{CatalogEntry, CatalogPage, ProductDetail};
use larek_core::checkout::{OrderConfirmation, OrderRequest};
use larek_core::ids::ProductId;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::endpoint::Endpoint;
use crate::error::GatewayError;
use crate::retry::RetryPolicy;
use crate::settings::GatewaySettings;
use crate::Gateway;

/// Error body the API sends with non-success statuses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

/// Gateway talking to the storefront API over HTTP.
///
/// Catalog and item reads are retried on transient failures according to
/// [`RetryPolicy::for_endpoint`]. Orders are sent exactly once.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
    settings: GatewaySettings,
}

impl HttpGateway {
    /// Create a gateway with the given settings.
    pub fn new(settings: GatewaySettings) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| GatewayError::Connection(e.to_string()))?;
        Ok(Self { client, settings })
    }

    /// Get the settings in use.
    pub fn settings(&self) -> &GatewaySettings {
        &self.settings
    }

    fn url(&self, path: &str) -> String {
        join_url(&self.settings.api_url, path)
    }

    fn with_cdn(&self, mut entry: CatalogEntry) -> CatalogEntry {
        entry.image = resolve_image_url(&self.settings.cdn_url, &entry.image);
        entry
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        path: &str,
    ) -> Result<T, GatewayError> {
        let url = self.url(path);
        let policy = RetryPolicy::for_endpoint(endpoint, self.settings.max_retries)
            .with_backoff(self.settings.backoff);

        let mut attempt = 0;
        loop {
            debug!(endpoint = %endpoint, url = %url, attempt, "sending request");
            let result = self.send(self.client.get(&url), &url).await;
            match result {
                Ok(value) => return Ok(value),
                Err(e) if policy.should_retry(&e, attempt) => {
                    let delay = policy.backoff.delay(attempt);
                    warn!(endpoint = %endpoint, attempt, error = %e, ?delay, "retrying request");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        url: &str,
    ) -> Result<T, GatewayError> {
        let response = request
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.settings.timeout))?;
        decode(response, url).await
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch_catalog(&self) -> Result<Vec<CatalogEntry>, GatewayError> {
        let page: CatalogPage<CatalogEntry> = self.get_json(Endpoint::Catalog, "/product").await?;
        if page.total != page.items.len() as u64 {
            debug!(total = page.total, received = page.items.len(), "catalog page is partial");
        }
        Ok(page.items.into_iter().map(|e| self.with_cdn(e)).collect())
    }

    async fn fetch_item(&self, id: &ProductId) -> Result<ProductDetail, GatewayError> {
        let path = format!("/product/{}", id);
        let mut detail: ProductDetail = self.get_json(Endpoint::Item, &path).await?;
        detail.entry = self.with_cdn(detail.entry);
        Ok(detail)
    }

    async fn submit_order(&self, order: &OrderRequest) -> Result<OrderConfirmation, GatewayError> {
        let url = self.url("/order");
        debug!(endpoint = %Endpoint::Order, items = order.items.len(), total = order.total, "submitting order");
        self.send(self.client.post(&url).json(order), &url).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response, url: &str) -> Result<T, GatewayError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| GatewayError::Connection(e.to_string()))?;

    if status.is_success() {
        return serde_json::from_str(&body).map_err(GatewayError::from);
    }
    Err(error_from_body(status.as_u16(), url, &body))
}

/// Turn a non-success response into an error, preferring the server's message.
pub(crate) fn error_from_body(status: u16, url: &str, body: &str) -> GatewayError {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(parsed) if !parsed.error.trim().is_empty() => GatewayError::rejected(status, parsed.error),
        _ => GatewayError::Http {
            status,
            url: url.to_string(),
        },
    }
}

fn map_transport_error(e: reqwest::Error, timeout: Duration) -> GatewayError {
    if e.is_timeout() {
        GatewayError::Timeout(timeout)
    } else if e.is_decode() {
        GatewayError::Deserialization(e.to_string())
    } else {
        GatewayError::Connection(e.to_string())
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Prefix a relative image path with the CDN origin.
///
/// Absolute URLs are returned unchanged.
pub fn resolve_image_url(cdn_url: &str, image: &str) -> String {
    if image.starts_with("http://") || image.starts_with("https://") {
        image.to_string()
    } else {
        join_url(cdn_url, image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_image_url() {
        let cdn = "https://cdn.example/content/";
        assert_eq!(resolve_image_url(cdn, "/5_Dots.svg"), "https://cdn.example/content/5_Dots.svg");
        assert_eq!(resolve_image_url(cdn, "Shell.svg"), "https://cdn.example/content/Shell.svg");
        assert_eq!(
            resolve_image_url(cdn, "https://other.example/a.svg"),
            "https://other.example/a.svg"
        );
    }

    #[test]
    fn test_error_body_message_is_surfaced() {
        let err = error_from_body(400, "/order", r#"{"error":"Invalid order total"}"#);
        assert_eq!(err.to_string(), "Invalid order total");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn test_unreadable_error_body_falls_back_to_status() {
        let err = error_from_body(502, "https://api/product", "<html>Bad gateway</html>");
        assert_eq!(
            err,
            GatewayError::Http {
                status: 502,
                url: "https://api/product".to_string()
            }
        );
        assert!(err.is_transient());
    }

    #[test]
    fn test_gateway_builds_from_default_settings() {
        let gateway = HttpGateway::new(GatewaySettings::default()).unwrap();
        assert_eq!(gateway.url("/product"), format!("{}/product", crate::DEFAULT_API_URL));
    }
}
