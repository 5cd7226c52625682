use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::event::Event;

/// Emitted by the building registry when a heritage building is registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingCreated {
    pub building_id: Uuid,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
}

impl Event for BuildingCreated {
    const TOPIC: &'static str = "turath.buildings.created";
    const EVENT_TYPE: &'static str = "turath.buildings.created";

    fn key(&self) -> String {
        self.building_id.to_string()
    }
}

/// Emitted by the building registry when building details change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildingUpdated {
    pub building_id: Uuid,
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub description: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub image_url: Option<String>,
}

impl Event for BuildingUpdated {
    const TOPIC: &'static str = "turath.buildings.updated";
    const EVENT_TYPE: &'static str = "turath.buildings.updated";

    fn key(&self) -> String {
        self.building_id.to_string()
    }
}
