use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::Event;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedOperator {
    pub operator_id: String,
    pub operator_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStatusInfo {
    pub previous: Option<String>,
    #[serde(rename = "new")]
    pub new_status: String,
    pub reason: Option<String>,
    pub assigned_to: Option<AssignedOperator>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseResolution {
    pub summary: Option<String>,
    #[serde(default)]
    pub actions_taken: Vec<String>,
    pub closing_message: Option<String>,
}

/// Internal-bus republication of a CRM case status webhook, translated
/// verbatim so other local services can react to case lifecycle changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStatusChanged {
    pub message_type: String,
    pub case_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: CaseStatusInfo,
    pub resolution: Option<CaseResolution>,
}

impl Event for CaseStatusChanged {
    const TOPIC: &'static str = "turath.cases.status-changed";
    const EVENT_TYPE: &'static str = "turath.cases.status-changed";

    fn key(&self) -> String {
        self.case_id.clone()
    }
}
