//! Request and response bodies for the Home Assistant `/api/states` endpoints.

use serde::{Deserialize, Serialize};

/// State object returned by `GET/POST /api/states/<entity_id>`.
///
/// Home Assistant also returns `attributes`, `last_changed` and friends;
/// none of them matter here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityState {
    pub entity_id: String,
    pub state: String,
}

/// Body for `POST /api/states/<entity_id>`.
#[derive(Debug, Clone, Serialize)]
pub struct SetStateRequest<'a> {
    pub state: &'a str,
}

/// Response of `GET /api/`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiStatus {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entity_state_ignores_extra_fields() {
        let json = r#"{
            "entity_id": "input_text.uber_eats_url",
            "state": "https://www.ubereats.com/orders/abc",
            "attributes": {"max": 255, "mode": "text"},
            "last_changed": "2024-02-10T18:22:31.123456+00:00",
            "context": {"id": "01HP", "parent_id": null, "user_id": null}
        }"#;
        let state: EntityState = serde_json::from_str(json).unwrap();
        assert_eq!(state.entity_id, "input_text.uber_eats_url");
        assert_eq!(state.state, "https://www.ubereats.com/orders/abc");
    }

    #[test]
    fn set_state_body_only_carries_state() {
        let json = serde_json::to_string(&SetStateRequest { state: "Delivered" }).unwrap();
        assert_eq!(json, r#"{"state":"Delivered"}"#);
    }
}
