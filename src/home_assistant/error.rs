//! Error types for the Home Assistant REST client.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HomeAssistantError {
    /// HTTP 401, the long-lived access token was rejected.
    #[error("Home Assistant rejected the access token")]
    Unauthorized,

    #[error("entity not found: {0}")]
    EntityNotFound(String),

    /// Any other non-success status.
    #[error("Home Assistant API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}
