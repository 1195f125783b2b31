pub mod client;
pub mod error;
#[cfg(test)]
pub mod memory;
pub mod types;

pub use client::{HomeAssistantConnector, StateStore, StoreConnector};
pub use error::HomeAssistantError;
