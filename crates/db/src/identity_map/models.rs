use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of local record an identity mapping points at.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum LocalEntityType {
    User,
    Building,
    Claim,
    IotAlert,
}

impl LocalEntityType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Building => "building",
            Self::Claim => "claim",
            Self::IotAlert => "iot_alert",
        }
    }
}

impl FromStr for LocalEntityType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "user" => Ok(Self::User),
            "building" => Ok(Self::Building),
            "claim" => Ok(Self::Claim),
            "iot_alert" => Ok(Self::IotAlert),
            _ => Err(format!("unknown local entity type: {value}")),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SyncStatus {
    Synced,
    Pending,
    Failed,
}

impl SyncStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Synced => "synced",
            Self::Pending => "pending",
            Self::Failed => "failed",
        }
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "synced" => Ok(Self::Synced),
            "pending" => Ok(Self::Pending),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown sync status: {value}")),
        }
    }
}

/// Durable correspondence between one local entity and one remote CRM record.
///
/// At most one row exists per `(local_entity_type, local_entity_id)`, and
/// `remote_entity_id` is unique across all rows so reverse lookups are
/// unambiguous.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdentityMapping {
    pub local_entity_type: LocalEntityType,
    pub local_entity_id: Uuid,
    pub remote_entity_id: String,
    pub sync_status: SyncStatus,
    pub last_sync_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
