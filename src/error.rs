use thiserror::Error;

use crate::home_assistant::HomeAssistantError;
use crate::ubereats::UberEatsError;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Uber Eats error: {0}")]
    UberEats(#[from] UberEatsError),

    #[error("Home Assistant error: {0}")]
    HomeAssistant(#[from] HomeAssistantError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_layer_errors() {
        let err: TrackerError = UberEatsError::Request {
            status: 500,
            body: String::new(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Uber Eats error: request failed with status code 500"
        );

        let err: TrackerError = HomeAssistantError::Unauthorized.into();
        assert_eq!(
            err.to_string(),
            "Home Assistant error: Home Assistant rejected the access token"
        );
    }
}
