//! HTTP client for the orderbook service.

use std::time::Duration;

use alloy::primitives::Address;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::{OrderbookError, OrderbookResult};
use crate::types::{
    addr_hex, ActiveFilter, CancelAck, OrderRecord, OrderbookStatus, Page, StatusResponse,
    SubmitAck, SubmitRequest,
};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Client for the orderbook REST API.
#[derive(Debug, Clone)]
pub struct OrderbookClient {
    client: Client,
    base_url: String,
}

impl OrderbookClient {
    /// Create a client for the given base URL (scheme and host, no trailing
    /// slash required).
    pub fn new(base_url: impl Into<String>) -> OrderbookResult<Self> {
        let client = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .build()
            .map_err(|e| OrderbookError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Create a client with a custom request timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> OrderbookResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OrderbookError::HttpClient(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Submit a signed order for publication.
    pub async fn submit(&self, request: &SubmitRequest) -> OrderbookResult<SubmitAck> {
        let url = format!("{}/api/orders/", self.base_url);
        debug!(order_hash = %request.order_hash, "Submitting order");

        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| OrderbookError::HttpClient(e.to_string()))?;

        let ack: SubmitAck = decode(check_status(response).await?).await?;
        info!(order_hash = %request.order_hash, status = %ack.order.status, "Order submitted");
        Ok(ack)
    }

    /// Fetch the first page of active orders, optionally filtered server-side.
    pub async fn fetch_active(&self, filter: &ActiveFilter) -> OrderbookResult<Page<OrderRecord>> {
        let url = format!("{}/api/orders/active/", self.base_url);

        let response = self
            .client
            .get(&url)
            .query(&filter.query_pairs())
            .send()
            .await
            .map_err(|e| OrderbookError::HttpClient(e.to_string()))?;

        let page: Page<OrderRecord> = decode(check_status(response).await?).await?;
        debug!(count = page.count, returned = page.results.len(), "Fetched active orders");
        Ok(page)
    }

    /// Fetch a single order by hash. Returns `None` on 404.
    pub async fn fetch_by_hash(&self, order_hash: &str) -> OrderbookResult<Option<OrderRecord>> {
        let url = format!("{}/api/orders/{}/", self.base_url, order_hash);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OrderbookError::HttpClient(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(decode(check_status(response).await?).await?))
    }

    /// Fetch the lightweight status view of an order.
    pub async fn fetch_status(&self, order_hash: &str) -> OrderbookResult<StatusResponse> {
        let url = format!("{}/api/orders/{}/status/", self.base_url, order_hash);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| OrderbookError::HttpClient(e.to_string()))?;

        decode(check_status(response).await?).await
    }

    /// Fetch all orders for a maker, optionally restricted to one status.
    pub async fn fetch_by_maker(
        &self,
        maker: Address,
        status: Option<OrderbookStatus>,
    ) -> OrderbookResult<Page<OrderRecord>> {
        let url = format!("{}/api/orders/maker/{}/", self.base_url, addr_hex(&maker));

        let mut request = self.client.get(&url);
        if let Some(status) = status {
            request = request.query(&[("status", status.to_string())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| OrderbookError::HttpClient(e.to_string()))?;

        decode(check_status(response).await?).await
    }

    /// Mark an order cancelled. The orderbook stops serving it; on-chain
    /// invalidation is the maker's separate concern.
    pub async fn cancel(&self, order_hash: &str) -> OrderbookResult<CancelAck> {
        let url = format!("{}/api/orders/{}/cancel/", self.base_url, order_hash);
        debug!(order_hash, "Cancelling order");

        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|e| OrderbookError::HttpClient(e.to_string()))?;

        let ack: CancelAck = decode(check_status(response).await?).await?;
        info!(order_hash, success = ack.success, "Order cancelled");
        Ok(ack)
    }
}

async fn check_status(response: Response) -> OrderbookResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(OrderbookError::Status {
        status: status.as_u16(),
        body,
    })
}

async fn decode<T: DeserializeOwned>(response: Response) -> OrderbookResult<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| OrderbookError::Decode(e.to_string()))
}
