//! Reads the tracked share link from Home Assistant and writes the order
//! status back.

use tracing::info;

use crate::home_assistant::{HomeAssistantError, StateStore};
use crate::ubereats::OrderStatus;

/// Entity ids the bridge reads and writes.
#[derive(Debug, Clone)]
pub struct Entities {
    /// Sensor that receives the status label.
    pub sensor: String,
    /// `input_text` holding the share link.
    pub url: String,
}

pub struct StateBridge<'a, S: StateStore> {
    store: &'a S,
    entities: &'a Entities,
}

impl<'a, S: StateStore> StateBridge<'a, S> {
    pub fn new(store: &'a S, entities: &'a Entities) -> Self {
        Self { store, entities }
    }

    pub async fn read_tracked_link(&self) -> Result<String, HomeAssistantError> {
        Ok(self.store.get_state(&self.entities.url).await?.state)
    }

    pub async fn write_status(&self, status: &OrderStatus) -> Result<(), HomeAssistantError> {
        self.store
            .set_state(&self.entities.sensor, status.label())
            .await?;
        info!("Updated sensor with status: {status}");
        Ok(())
    }

    /// Empty the URL entity once the order is delivered. Returns whether a
    /// write happened.
    pub async fn clear_link_if_delivered(
        &self,
        status: &OrderStatus,
    ) -> Result<bool, HomeAssistantError> {
        if !status.is_delivered() {
            return Ok(false);
        }
        self.store.set_state(&self.entities.url, "").await?;
        info!("Cleared Uber Eats URL after delivery.");
        Ok(true)
    }
}
