use std::time::Duration;

use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::Value;
use tracing::debug;

use super::error::UberEatsError;
use super::share_link::extract_order_uuid;
use super::types::{
    ActiveOrdersRequest, ORDER_PHASE_POINTER, ORDER_STATUS_POINTER, ORDERS_POINTER, OrderPhase,
    OrderStatus,
};

const API_URL: &str = "https://www.ubereats.com/_p/api/getActiveOrdersV1";

/// Body text the tracking page shows once the courier has picked up the
/// order. The analytics field is sometimes stale, so this wins over it.
const HEADING_YOUR_WAY: &str = "Heading your way";

/// Browser headers the vendor expects before it accepts the request.
const BROWSER_HEADERS: &[(&str, &str)] = &[
    ("authority", "www.ubereats.com"),
    ("accept", "*/*"),
    ("accept-language", "en-US,en;q=0.9"),
    ("cache-control", "no-cache"),
    ("dnt", "1"),
    ("origin", "https://www.ubereats.com"),
    ("pragma", "no-cache"),
    ("sec-ch-prefers-color-scheme", "dark"),
    (
        "sec-ch-ua",
        r#""Not A(Brand";v="99", "Microsoft Edge";v="121", "Chromium";v="121""#,
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", r#""macOS""#),
    ("sec-fetch-dest", "empty"),
    ("sec-fetch-mode", "cors"),
    ("sec-fetch-site", "same-origin"),
    (
        "user-agent",
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36 Edg/121.0.0.0",
    ),
    ("x-csrf-token", "x"),
    ("x-uber-client-gitref", "726018ef17263626429ea42bd0e77bf88ad6a5d7"),
];

/// Anything that can turn a share link into an [`OrderStatus`].
pub trait StatusResolver {
    async fn resolve(&self, share_link: &str) -> Result<OrderStatus, UberEatsError>;
}

pub struct UberEatsClient {
    client: Client,
    base_url: String,
}

impl UberEatsClient {
    pub fn new(timeout: Duration) -> Result<Self, UberEatsError> {
        Self::with_base_url(API_URL.to_string(), timeout)
    }

    /// Create a client pointing at a custom endpoint (useful for testing).
    pub fn with_base_url(base_url: String, timeout: Duration) -> Result<Self, UberEatsError> {
        let client = Client::builder()
            .default_headers(browser_headers())
            .timeout(timeout)
            .build()?;
        Ok(Self { client, base_url })
    }

    /// Fetch the raw response body for an order. Non-2xx is an error.
    pub async fn fetch_active_orders(
        &self,
        share_link: &str,
        order_uuid: &str,
    ) -> Result<String, UberEatsError> {
        let response = self
            .client
            .post(&self.base_url)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::REFERER, share_link)
            .json(&ActiveOrdersRequest::new(order_uuid))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UberEatsError::Request {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.text().await?)
    }
}

impl StatusResolver for UberEatsClient {
    async fn resolve(&self, share_link: &str) -> Result<OrderStatus, UberEatsError> {
        let order_uuid = extract_order_uuid(share_link)?;
        debug!(order_uuid, "querying order status");
        let body = self.fetch_active_orders(share_link, order_uuid).await?;
        resolve_status(&body)
    }
}

/// Map a raw `getActiveOrdersV1` body to a status label.
///
/// Only the first order is inspected, and only the fields needed for the
/// label are read. Anything else in the document may have any shape.
pub fn resolve_status(body: &str) -> Result<OrderStatus, UberEatsError> {
    let response: Value = serde_json::from_str(body)?;
    let orders = response
        .pointer(ORDERS_POINTER)
        .ok_or(UberEatsError::MissingField("data.orders"))?;
    let order = orders.get(0).ok_or(UberEatsError::NoActiveOrders)?;
    let phase = order
        .pointer(ORDER_PHASE_POINTER)
        .ok_or(UberEatsError::MissingField("orderInfo.orderPhase"))?;

    match OrderPhase::from_value(phase) {
        OrderPhase::Completed => Ok(OrderStatus::Delivered),
        OrderPhase::Active if body.contains(HEADING_YOUR_WAY) => Ok(OrderStatus::EnrouteToEater),
        OrderPhase::Active => order
            .pointer(ORDER_STATUS_POINTER)
            .and_then(Value::as_str)
            .map(|raw| OrderStatus::Vendor(raw.to_string()))
            .ok_or(UberEatsError::MissingField("analytics.data.order_status")),
        OrderPhase::Other => Ok(OrderStatus::Unknown),
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    for (name, value) in BROWSER_HEADERS {
        headers.insert(*name, HeaderValue::from_static(*value));
    }
    headers
}
