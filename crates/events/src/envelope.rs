use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::EventError;
use crate::event::Event;

/// Common envelope wrapping every event on the internal bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventEnvelope<T> {
    /// Unique id of this event instance.
    pub event_id: Uuid,

    /// Fully qualified event type name.
    pub event_type: String,

    /// When the event was emitted.
    pub timestamp: DateTime<Utc>,

    /// Name of the service that emitted the event.
    pub source: String,

    /// Correlation id threading one logical flow across services.
    pub correlation_id: Uuid,

    /// The event payload.
    pub payload: T,
}

impl<T: Event> EventEnvelope<T> {
    pub fn new(payload: T, source: &str, correlation_id: Uuid) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            event_type: T::EVENT_TYPE.to_string(),
            timestamp: Utc::now(),
            source: source.to_string(),
            correlation_id,
            payload,
        }
    }

    pub fn topic(&self) -> &'static str {
        T::TOPIC
    }

    /// Partition key, delegated to the payload.
    pub fn key(&self) -> String {
        self.payload.key()
    }

    pub fn to_json_bytes(&self) -> Result<Vec<u8>, EventError> {
        serde_json::to_vec(self).map_err(|e| EventError::Serialization {
            event_type: T::EVENT_TYPE.to_string(),
            cause: e.to_string(),
        })
    }

    pub fn from_json_bytes(bytes: &[u8]) -> Result<Self, EventError> {
        serde_json::from_slice(bytes).map_err(|e| EventError::InvalidEnvelope(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::buildings::BuildingCreated;

    fn sample_event() -> BuildingCreated {
        BuildingCreated {
            building_id: Uuid::new_v4(),
            code: "BLDG-01".to_string(),
            name: "Bab Agnaou".to_string(),
            address: Some("Rue de la Kasbah, Marrakesh".to_string()),
            latitude: Some(31.6167),
            longitude: Some(-7.9886),
            image_url: None,
        }
    }

    #[test]
    fn envelope_round_trips_through_json() {
        let payload = sample_event();
        let building_id = payload.building_id;
        let envelope = EventEnvelope::new(payload, "building-registry", Uuid::new_v4());

        let bytes = envelope.to_json_bytes().expect("serialize");
        let parsed: EventEnvelope<BuildingCreated> =
            EventEnvelope::from_json_bytes(&bytes).expect("deserialize");

        assert_eq!(parsed.event_id, envelope.event_id);
        assert_eq!(parsed.event_type, BuildingCreated::EVENT_TYPE);
        assert_eq!(parsed.payload.building_id, building_id);
    }

    #[test]
    fn envelope_key_follows_the_payload() {
        let payload = sample_event();
        let building_id = payload.building_id;
        let envelope = EventEnvelope::new(payload, "building-registry", Uuid::new_v4());

        assert_eq!(envelope.key(), building_id.to_string());
    }

    #[test]
    fn malformed_bytes_are_rejected() {
        let result = EventEnvelope::<BuildingCreated>::from_json_bytes(b"not-json");
        assert!(matches!(result, Err(EventError::InvalidEnvelope(_))));
    }
}
