use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// A citizen report that upstream enrichment has resolved to a known
/// building and user.
///
/// `claim_id` is present when the report originated from the partner
/// claims system; it is what later allows case status updates to be
/// relayed back out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenAlertIdentified {
    pub user_id: Uuid,
    pub building_id: Uuid,
    pub building_code: String,
    pub building_name: String,
    pub image_url: Option<String>,
    pub description: String,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claim_id: Option<Uuid>,
}

impl Event for CitizenAlertIdentified {
    const TOPIC: &'static str = "turath.alerts.citizen-identified";
    const EVENT_TYPE: &'static str = "turath.alerts.citizen-identified";

    fn key(&self) -> String {
        self.building_id.to_string()
    }
}

/// A sensor threshold breach raised by the IoT telemetry service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAlert {
    pub device_id: Uuid,
    pub device_serial_number: String,
    pub building_id: Uuid,
    pub sf_asset_id: Option<String>,
    pub metric_type: String,
    pub value: f64,
    pub unit: String,
    pub measured_at: DateTime<Utc>,
    pub threshold_min: Option<f64>,
    pub threshold_max: Option<f64>,
    pub severity_level: String,
    pub breach_direction: String,
    pub description: Option<String>,
}

impl Event for RiskAlert {
    const TOPIC: &'static str = "turath.alerts.risk";
    const EVENT_TYPE: &'static str = "turath.alerts.risk";

    fn key(&self) -> String {
        self.building_id.to_string()
    }
}
