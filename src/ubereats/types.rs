//! Wire types for the `getActiveOrdersV1` endpoint and the order status
//! labels derived from it.
//!
//! The response is large and loosely shaped, so it is read through JSON
//! pointers rather than a full typed model.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Timezone literal the web client sends with every request.
pub const TIMEZONE: &str = "America/Los_Angeles";

/// Request body for `POST /_p/api/getActiveOrdersV1`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveOrdersRequest<'a> {
    pub order_uuid: &'a str,
    pub timezone: &'a str,
    pub show_app_upsell_illustration: bool,
}

impl<'a> ActiveOrdersRequest<'a> {
    pub fn new(order_uuid: &'a str) -> Self {
        Self {
            order_uuid,
            timezone: TIMEZONE,
            show_app_upsell_illustration: true,
        }
    }
}

/// JSON pointers into the `getActiveOrdersV1` response, relative to the body
/// root. Only these paths are read; the rest of the document is ignored.
pub const ORDERS_POINTER: &str = "/data/orders";
pub const ORDER_PHASE_POINTER: &str = "/orderInfo/orderPhase";
pub const ORDER_STATUS_POINTER: &str = "/analytics/data/order_status";

/// Coarse lifecycle stage reported in `orderInfo.orderPhase`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderPhase {
    Completed,
    Active,
    /// Anything else, including `null` or a non-string value.
    Other,
}

impl OrderPhase {
    pub fn from_value(value: &Value) -> Self {
        match value.as_str() {
            Some("COMPLETED") => OrderPhase::Completed,
            Some("ACTIVE") => OrderPhase::Active,
            _ => OrderPhase::Other,
        }
    }
}

/// Label written to the Home Assistant sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Delivered,
    EnrouteToEater,
    /// Raw `analytics.data.order_status` string, passed through untouched.
    Vendor(String),
    Unknown,
}

impl OrderStatus {
    pub const DELIVERED: &'static str = "Delivered";

    pub fn label(&self) -> &str {
        match self {
            OrderStatus::Delivered => Self::DELIVERED,
            OrderStatus::EnrouteToEater => "EnrouteToEater",
            OrderStatus::Vendor(raw) => raw,
            OrderStatus::Unknown => "Unknown",
        }
    }

    /// Label comparison, so a raw vendor status of "Delivered" also counts.
    pub fn is_delivered(&self) -> bool {
        self.label() == Self::DELIVERED
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
