use serde::Serialize;
use uuid::Uuid;

use turath_events::events::{CaseResolution, CaseStatusChanged, CaseStatusInfo};

/// Message published to the partner claims bus.
///
/// Structurally different from the internal event: the claim id replaces
/// the case id, the timestamp is an ISO-8601 string, and the original
/// case id travels as an opaque service reference.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimStatusMessage {
    pub message_type: String,
    pub timestamp: String,
    pub claim_id: Uuid,
    pub status: CaseStatusInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<CaseResolution>,
    pub service_reference: String,
}

impl ClaimStatusMessage {
    pub fn from_case_event(claim_id: Uuid, event: &CaseStatusChanged) -> Self {
        Self {
            message_type: event.message_type.clone(),
            timestamp: event.timestamp.to_rfc3339(),
            claim_id,
            status: event.status.clone(),
            resolution: event.resolution.clone(),
            service_reference: event.case_id.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use turath_events::events::AssignedOperator;

    #[test]
    fn message_carries_claim_id_iso_timestamp_and_new_status() {
        let claim_id = Uuid::new_v4();
        let event = CaseStatusChanged {
            message_type: "case.status.changed".to_string(),
            case_id: "500000000000001AAA".to_string(),
            timestamp: Utc.with_ymd_and_hms(2025, 3, 14, 9, 26, 53).unwrap(),
            status: CaseStatusInfo {
                previous: Some("In Progress".to_string()),
                new_status: "Closed".to_string(),
                reason: Some("resolved on site".to_string()),
                assigned_to: Some(AssignedOperator {
                    operator_id: "op-7".to_string(),
                    operator_name: "A. Benani".to_string(),
                }),
            },
            resolution: None,
        };

        let message = ClaimStatusMessage::from_case_event(claim_id, &event);
        let json = serde_json::to_value(&message).expect("serialize");

        assert_eq!(json["claimId"], claim_id.to_string());
        assert_eq!(json["timestamp"], "2025-03-14T09:26:53+00:00");
        assert_eq!(json["status"]["new"], "Closed");
        assert_eq!(json["serviceReference"], "500000000000001AAA");
        assert!(json.get("resolution").is_none());
    }
}
