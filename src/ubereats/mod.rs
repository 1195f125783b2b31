pub mod client;
pub mod error;
pub mod share_link;
pub mod types;

pub use client::{StatusResolver, UberEatsClient};
pub use error::UberEatsError;
pub use types::OrderStatus;
