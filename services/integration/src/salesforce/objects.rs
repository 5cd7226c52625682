//! Typed request payloads for the CRM's sobject endpoints.

use serde::Serialize;

/// Object kind path segments.
pub mod kinds {
    pub const ASSET: &str = "Asset";
    pub const CASE: &str = "Case";
    pub const LOCATION: &str = "HeritageLocation__c";
}

/// Canonical coordinate key at 6-decimal precision.
///
/// Used both as the location record name and as the exact-match dedup key
/// when repeated reports arrive for the same spot.
pub fn coordinate_key(latitude: f64, longitude: f64) -> String {
    format!("{latitude:.6},{longitude:.6}")
}

#[derive(Debug, Clone, Serialize)]
pub struct LocationPayload {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Latitude__c")]
    pub latitude: f64,
    #[serde(rename = "Longitude__c")]
    pub longitude: f64,
}

impl LocationPayload {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            name: coordinate_key(latitude, longitude),
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AssetPayload {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "SerialNumber")]
    pub serial_number: String,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "HeritageLocation__c", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
    #[serde(rename = "ImageUrl__c", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl AssetPayload {
    pub fn new(name: &str, serial_number: &str) -> Self {
        Self {
            name: name.to_string(),
            serial_number: serial_number.to_string(),
            description: None,
            location_id: None,
            image_url: None,
        }
    }

    pub fn description(mut self, description: String) -> Self {
        self.description = Some(description);
        self
    }

    pub fn location(mut self, location_id: Option<String>) -> Self {
        self.location_id = location_id;
        self
    }

    pub fn image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url;
        self
    }
}

/// Partial Asset update; only the populated fields are patched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AssetUpdate {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ImageUrl__c", skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CasePayload {
    #[serde(rename = "Subject")]
    pub subject: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Priority")]
    pub priority: String,
    #[serde(rename = "Origin")]
    pub origin: String,
    #[serde(rename = "ContactId", skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<String>,
    #[serde(rename = "AssetId", skip_serializing_if = "Option::is_none")]
    pub asset_id: Option<String>,
    #[serde(rename = "HeritageLocation__c", skip_serializing_if = "Option::is_none")]
    pub location_id: Option<String>,
}

impl CasePayload {
    pub fn new(subject: &str, description: &str, priority: &str, origin: &str) -> Self {
        Self {
            subject: subject.to_string(),
            description: description.to_string(),
            priority: priority.to_string(),
            origin: origin.to_string(),
            contact_id: None,
            asset_id: None,
            location_id: None,
        }
    }

    pub fn contact(mut self, contact_id: Option<String>) -> Self {
        self.contact_id = contact_id;
        self
    }

    pub fn asset(mut self, asset_id: Option<String>) -> Self {
        self.asset_id = asset_id;
        self
    }

    pub fn location(mut self, location_id: Option<String>) -> Self {
        self.location_id = location_id;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_key_uses_six_decimals() {
        assert_eq!(coordinate_key(31.6, -7.9), "31.600000,-7.900000");
    }

    #[test]
    fn asset_payload_omits_absent_fields() {
        let payload = AssetPayload::new("Bab Agnaou", "BLDG-01");
        let json = serde_json::to_value(&payload).expect("serialize");

        assert_eq!(json["Name"], "Bab Agnaou");
        assert_eq!(json["SerialNumber"], "BLDG-01");
        assert!(json.get("Description").is_none());
        assert!(json.get("HeritageLocation__c").is_none());
    }

    #[test]
    fn case_payload_keeps_salesforce_field_names() {
        let payload = CasePayload::new("subject", "details", "High", "Web")
            .contact(Some("003000000000001AAA".to_string()))
            .asset(None);
        let json = serde_json::to_value(&payload).expect("serialize");

        assert_eq!(json["Priority"], "High");
        assert_eq!(json["ContactId"], "003000000000001AAA");
        assert!(json.get("AssetId").is_none());
    }
}
