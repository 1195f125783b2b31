//! Error types for the Uber Eats order status client.

use thiserror::Error;

/// Errors raised while resolving an order status from a share link.
#[derive(Debug, Error)]
pub enum UberEatsError {
    /// The share link did not contain an `/orders/<uuid>` segment.
    /// No request is sent in this case.
    #[error("failed to extract order UUID from share link: {share_link}")]
    Extraction { share_link: String },

    /// The vendor answered with a non-success status code.
    #[error("request failed with status code {status}{}", body_excerpt(.body))]
    Request { status: u16, body: String },

    /// The response body was not the JSON shape we expect.
    #[error("failed to parse order status response: {0}")]
    Parse(#[from] serde_json::Error),

    /// `data.orders` was empty.
    #[error("response contained no active orders")]
    NoActiveOrders,

    #[error("response is missing field `{0}`")]
    MissingField(&'static str),

    /// Transport failure (DNS, connection refused, timeout).
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Longest slice of a rejected response body quoted in the error message.
const BODY_EXCERPT_CHARS: usize = 200;

fn body_excerpt(body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return String::new();
    }
    match body.char_indices().nth(BODY_EXCERPT_CHARS) {
        Some((end, _)) => format!(": {}…", &body[..end]),
        None => format!(": {body}"),
    }
}
