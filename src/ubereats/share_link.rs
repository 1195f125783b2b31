//! Order UUID extraction from Uber Eats share links.

use std::sync::LazyLock;

use regex::Regex;

use super::error::UberEatsError;

static ORDER_UUID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        "/orders/([a-fA-F0-9]{8}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{4}-[a-fA-F0-9]{12})",
    )
    .expect("order UUID pattern is valid")
});

/// Extract the order UUID embedded in a share link such as
/// `https://www.ubereats.com/orders/<uuid>`.
///
/// A UUID immediately followed by a query string marker is skipped and the
/// search continues with the next `/orders/` segment. The match is returned
/// exactly as written; case is preserved.
pub fn extract_order_uuid(share_link: &str) -> Result<&str, UberEatsError> {
    ORDER_UUID
        .captures_iter(share_link)
        .filter_map(|caps| caps.get(1))
        .find(|m| !share_link[m.end()..].starts_with('?'))
        .map(|m| m.as_str())
        .ok_or_else(|| UberEatsError::Extraction {
            share_link: share_link.to_string(),
        })
}
