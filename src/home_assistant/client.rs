use std::time::Duration;

use reqwest::{Client, Response, StatusCode};
use tracing::debug;

use super::error::HomeAssistantError;
use super::types::{ApiStatus, EntityState, SetStateRequest};

/// Key/value view of the Home Assistant state machine.
pub trait StateStore {
    async fn get_state(&self, entity_id: &str) -> Result<EntityState, HomeAssistantError>;

    async fn set_state(
        &self,
        entity_id: &str,
        state: &str,
    ) -> Result<EntityState, HomeAssistantError>;
}

/// Opens a [`StateStore`] session scoped to one poll cycle. The session is
/// released when the returned value is dropped.
pub trait StoreConnector {
    type Store: StateStore;

    async fn connect(&self) -> Result<Self::Store, HomeAssistantError>;
}

/// Connection settings for the Home Assistant REST API.
///
/// `base_url` is the API root including `/api`, e.g.
/// `http://homeassistant.local:8123/api`.
#[derive(Debug, Clone)]
pub struct HomeAssistantConnector {
    base_url: String,
    token: String,
    timeout: Duration,
}

impl HomeAssistantConnector {
    pub fn new(base_url: &str, token: &str, timeout: Duration) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            timeout,
        }
    }
}

impl StoreConnector for HomeAssistantConnector {
    type Store = HomeAssistantSession;

    /// Build a fresh HTTP client and verify the API answers before handing
    /// out the session.
    async fn connect(&self) -> Result<HomeAssistantSession, HomeAssistantError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(self.timeout)
            .build()?;

        let response = client
            .get(format!("{}/", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await?;
        let status: ApiStatus = check_status(response, None).await?.json().await?;
        debug!(base_url = %self.base_url, message = %status.message, "opened Home Assistant session");

        Ok(HomeAssistantSession {
            client,
            base_url: self.base_url.clone(),
            token: self.token.clone(),
        })
    }
}

/// An open session against the Home Assistant REST API.
pub struct HomeAssistantSession {
    client: Client,
    base_url: String,
    token: String,
}

impl HomeAssistantSession {
    fn state_url(&self, entity_id: &str) -> String {
        format!("{}/states/{entity_id}", self.base_url)
    }
}

impl StateStore for HomeAssistantSession {
    async fn get_state(&self, entity_id: &str) -> Result<EntityState, HomeAssistantError> {
        let response = self
            .client
            .get(self.state_url(entity_id))
            .bearer_auth(&self.token)
            .send()
            .await?;
        Ok(check_status(response, Some(entity_id)).await?.json().await?)
    }

    async fn set_state(
        &self,
        entity_id: &str,
        state: &str,
    ) -> Result<EntityState, HomeAssistantError> {
        let response = self
            .client
            .post(self.state_url(entity_id))
            .bearer_auth(&self.token)
            .json(&SetStateRequest { state })
            .send()
            .await?;
        Ok(check_status(response, None).await?.json().await?)
    }
}

impl Drop for HomeAssistantSession {
    fn drop(&mut self) {
        debug!(base_url = %self.base_url, "closed Home Assistant session");
    }
}

/// Map non-success responses to typed errors. `entity_id` is set for reads,
/// where a 404 means the entity does not exist.
async fn check_status(
    response: Response,
    entity_id: Option<&str>,
) -> Result<Response, HomeAssistantError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match (status, entity_id) {
        (StatusCode::UNAUTHORIZED, _) => Err(HomeAssistantError::Unauthorized),
        (StatusCode::NOT_FOUND, Some(id)) => Err(HomeAssistantError::EntityNotFound(id.to_string())),
        _ => {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            Err(HomeAssistantError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }
}
