//! In-memory [`StateStore`] used by the bridge and poller tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::client::{StateStore, StoreConnector};
use super::error::HomeAssistantError;
use super::types::EntityState;

#[derive(Debug, Default)]
struct Inner {
    states: HashMap<String, String>,
    writes: Vec<(String, String)>,
    opened: usize,
    closed: usize,
    fail_connect: bool,
}

/// Shared handle; the connector and every session it opens see the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn with_state(entity_id: &str, state: &str) -> Self {
        let store = Self::default();
        store.put(entity_id, state);
        store
    }

    pub fn put(&self, entity_id: &str, state: &str) {
        self.inner
            .lock()
            .unwrap()
            .states
            .insert(entity_id.to_string(), state.to_string());
    }

    pub fn state(&self, entity_id: &str) -> Option<String> {
        self.inner.lock().unwrap().states.get(entity_id).cloned()
    }

    pub fn writes(&self) -> Vec<(String, String)> {
        self.inner.lock().unwrap().writes.clone()
    }

    pub fn opened(&self) -> usize {
        self.inner.lock().unwrap().opened
    }

    pub fn closed(&self) -> usize {
        self.inner.lock().unwrap().closed
    }

    pub fn fail_connect(&self) {
        self.inner.lock().unwrap().fail_connect = true;
    }
}

pub struct MemorySession {
    store: MemoryStore,
}

impl StoreConnector for MemoryStore {
    type Store = MemorySession;

    async fn connect(&self) -> Result<MemorySession, HomeAssistantError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.fail_connect {
            return Err(HomeAssistantError::Unauthorized);
        }
        inner.opened += 1;
        Ok(MemorySession {
            store: self.clone(),
        })
    }
}

impl StateStore for MemorySession {
    async fn get_state(&self, entity_id: &str) -> Result<EntityState, HomeAssistantError> {
        let state = self
            .store
            .state(entity_id)
            .ok_or_else(|| HomeAssistantError::EntityNotFound(entity_id.to_string()))?;
        Ok(EntityState {
            entity_id: entity_id.to_string(),
            state,
        })
    }

    async fn set_state(
        &self,
        entity_id: &str,
        state: &str,
    ) -> Result<EntityState, HomeAssistantError> {
        self.store.put(entity_id, state);
        self.store
            .inner
            .lock()
            .unwrap()
            .writes
            .push((entity_id.to_string(), state.to_string()));
        Ok(EntityState {
            entity_id: entity_id.to_string(),
            state: state.to_string(),
        })
    }
}

impl Drop for MemorySession {
    fn drop(&mut self) {
        self.store.inner.lock().unwrap().closed += 1;
    }
}
