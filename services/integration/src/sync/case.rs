use uuid::Uuid;

use crate::salesforce::objects::{coordinate_key, kinds, CasePayload, LocationPayload};
use crate::salesforce::SalesforceClient;
use crate::sync::SyncError;
use turath_db::identity_map::{IdentityMapRepository, LocalEntityType, SyncStatus};
use turath_events::events::{CitizenAlertIdentified, RiskAlert};

/// Case priority derived from an alert severity level.
pub fn priority_for(severity: &str) -> &'static str {
    if severity.eq_ignore_ascii_case("critical") {
        "High"
    } else {
        "Medium"
    }
}

/// Creates remote Cases for citizen alerts and IoT risk alerts.
///
/// Missing Contact/Asset mappings degrade the Case (the relationship is
/// omitted with a warning) but never block its creation.
pub struct CaseOrchestrator<M> {
    client: SalesforceClient,
    mappings: M,
}

impl<M: IdentityMapRepository> CaseOrchestrator<M> {
    pub fn new(client: SalesforceClient, mappings: M) -> Self {
        Self { client, mappings }
    }

    pub async fn create_citizen_case(
        &self,
        alert: &CitizenAlertIdentified,
    ) -> Result<String, SyncError> {
        let contact_id = self
            .resolve(LocalEntityType::User, alert.user_id, "contact")
            .await?;
        let asset_id = self
            .resolve(LocalEntityType::Building, alert.building_id, "asset")
            .await?;

        let location_id = match (alert.latitude, alert.longitude) {
            (Some(lat), Some(lon)) => Some(self.find_or_create_location(lat, lon).await?),
            _ => None,
        };

        let subject = format!("Citizen alert: {} ({})", alert.building_name, alert.building_code);
        let payload = CasePayload::new(&subject, &citizen_description(alert), "Medium", "Web")
            .contact(contact_id)
            .asset(asset_id)
            .location(location_id);

        let case_id = self.client.create(kinds::CASE, &payload).await?;

        // Claim correlation: only alerts that originated from the partner
        // claims system carry a claim id; the mapping written here is what
        // the outbound relay later resolves in reverse.
        if let Some(claim_id) = alert.claim_id {
            self.mappings
                .upsert(LocalEntityType::Claim, claim_id, &case_id, SyncStatus::Synced)
                .await?;
        }

        tracing::info!(
            building_id = %alert.building_id,
            case_id = %case_id,
            claim_id = ?alert.claim_id,
            "citizen alert case created"
        );
        Ok(case_id)
    }

    /// IoT risk cases are fire-and-forget: no mapping row is written.
    pub async fn create_risk_case(&self, alert: &RiskAlert) -> Result<String, SyncError> {
        let asset_id = match &alert.sf_asset_id {
            Some(id) => Some(id.clone()),
            None => {
                self.resolve(LocalEntityType::Building, alert.building_id, "asset")
                    .await?
            }
        };

        let subject = format!("Risk alert: {} on {}", alert.metric_type, alert.device_serial_number);
        let payload = CasePayload::new(
            &subject,
            &risk_description(alert),
            priority_for(&alert.severity_level),
            "IoT",
        )
        .asset(asset_id);

        let case_id = self.client.create(kinds::CASE, &payload).await?;

        tracing::info!(
            device_id = %alert.device_id,
            case_id = %case_id,
            severity = %alert.severity_level,
            "risk alert case created"
        );
        Ok(case_id)
    }

    /// Identity-map lookup whose absence degrades the case instead of
    /// failing it; store errors still propagate.
    async fn resolve(
        &self,
        entity_type: LocalEntityType,
        local_id: Uuid,
        role: &str,
    ) -> Result<Option<String>, SyncError> {
        let mapping = self.mappings.find(entity_type, local_id).await?;
        if mapping.is_none() {
            tracing::warn!(
                local_id = %local_id,
                role,
                "no identity mapping, creating case without this relationship"
            );
        }
        Ok(mapping.map(|m| m.remote_entity_id))
    }

    /// Reuse an existing location for these exact coordinates before
    /// creating a new one, so repeated reports at the same building do not
    /// proliferate near-identical records.
    async fn find_or_create_location(&self, lat: f64, lon: f64) -> Result<String, SyncError> {
        let key = coordinate_key(lat, lon);
        if let Some(existing) = self
            .client
            .find_one(kinds::LOCATION, "Name", &key)
            .await?
        {
            tracing::debug!(location_id = %existing, key = %key, "reusing existing location");
            return Ok(existing);
        }
        Ok(self
            .client
            .create(kinds::LOCATION, &LocationPayload::new(lat, lon))
            .await?)
    }
}

fn citizen_description(alert: &CitizenAlertIdentified) -> String {
    let mut lines = vec![
        format!("Building: {} ({})", alert.building_name, alert.building_code),
        alert.description.clone(),
    ];
    if let Some(url) = &alert.image_url {
        lines.push(format!("Photo: {url}"));
    }
    lines.join("\n")
}

fn risk_description(alert: &RiskAlert) -> String {
    let mut lines = vec![
        format!(
            "{} reading of {} {} on device {}",
            alert.metric_type, alert.value, alert.unit, alert.device_serial_number
        ),
        format!(
            "Severity: {}, breach direction: {}",
            alert.severity_level, alert.breach_direction
        ),
        format!(
            "Configured thresholds: min {}, max {}",
            alert
                .threshold_min
                .map_or("n/a".to_string(), |v| v.to_string()),
            alert
                .threshold_max
                .map_or("n/a".to_string(), |v| v.to_string()),
        ),
        format!("Measured at: {}", alert.measured_at.to_rfc3339()),
    ];
    if let Some(extra) = &alert.description {
        lines.push(extra.clone());
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::salesforce::TokenCache;
    use crate::testutil::InMemoryMappingRepo;
    use chrono::Utc;
    use serde_json::json;
    use std::sync::Arc;
    use turath_config::SalesforceConfig;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server: &MockServer) -> SalesforceClient {
        let config = SalesforceConfig {
            auth_url: format!("{}/token", server.uri()),
            client_id: "cid".to_string(),
            client_secret: "secret".to_string(),
            username: "integration@example.com".to_string(),
            password: "pw".to_string(),
            base_url: server.uri(),
            timeout_secs: 5,
        };
        let tokens = Arc::new(TokenCache::new(config.clone()).expect("cache should build"));
        SalesforceClient::new(&config, tokens).expect("client should build")
    }

    async fn mount_token_endpoint(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "token_type": "Bearer",
                "instance_url": server.uri(),
                "scope": "api",
            })))
            .mount(server)
            .await;
    }

    async fn mount_case_create(server: &MockServer, id: &str) {
        Mock::given(method("POST"))
            .and(path("/sobjects/Case"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": id,
                "success": true,
                "created": true,
            })))
            .mount(server)
            .await;
    }

    fn citizen_alert(user_id: Uuid, building_id: Uuid) -> CitizenAlertIdentified {
        CitizenAlertIdentified {
            user_id,
            building_id,
            building_code: "BLDG-01".to_string(),
            building_name: "Bab Agnaou".to_string(),
            image_url: None,
            description: "Cracks visible in the archway".to_string(),
            longitude: None,
            latitude: None,
            claim_id: None,
        }
    }

    fn risk_alert(building_id: Uuid) -> RiskAlert {
        RiskAlert {
            device_id: Uuid::new_v4(),
            device_serial_number: "SN-0042".to_string(),
            building_id,
            sf_asset_id: None,
            metric_type: "humidity".to_string(),
            value: 91.5,
            unit: "%".to_string(),
            measured_at: Utc::now(),
            threshold_min: Some(20.0),
            threshold_max: Some(80.0),
            severity_level: "CRITICAL".to_string(),
            breach_direction: "above".to_string(),
            description: None,
        }
    }

    async fn case_request_body(server: &MockServer) -> serde_json::Value {
        let requests = server.received_requests().await.expect("requests recorded");
        let case_request = requests
            .iter()
            .find(|r| r.url.path() == "/sobjects/Case")
            .expect("case creation request");
        serde_json::from_slice(&case_request.body).expect("json body")
    }

    #[tokio::test]
    async fn missing_contact_mapping_still_creates_the_case() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        mount_case_create(&server, "500000000000001AAA").await;

        let user_id = Uuid::new_v4();
        let building_id = Uuid::new_v4();
        // Asset mapping present, contact mapping absent
        let mappings = InMemoryMappingRepo::new().with_mapping(
            LocalEntityType::Building,
            building_id,
            "02i000000000001AAA",
        );
        let orchestrator = CaseOrchestrator::new(test_client(&server), mappings);

        let case_id = orchestrator
            .create_citizen_case(&citizen_alert(user_id, building_id))
            .await
            .expect("case creation should succeed");
        assert_eq!(case_id, "500000000000001AAA");

        let body = case_request_body(&server).await;
        assert!(body.get("ContactId").is_none());
        assert_eq!(body["AssetId"], "02i000000000001AAA");
    }

    #[tokio::test]
    async fn resolved_mappings_populate_both_relationships() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        mount_case_create(&server, "500000000000002AAA").await;

        let user_id = Uuid::new_v4();
        let building_id = Uuid::new_v4();
        let mappings = InMemoryMappingRepo::new()
            .with_mapping(LocalEntityType::User, user_id, "003000000000001AAA")
            .with_mapping(LocalEntityType::Building, building_id, "02i000000000001AAA");
        let orchestrator = CaseOrchestrator::new(test_client(&server), mappings);

        orchestrator
            .create_citizen_case(&citizen_alert(user_id, building_id))
            .await
            .expect("case creation should succeed");

        let body = case_request_body(&server).await;
        assert_eq!(body["ContactId"], "003000000000001AAA");
        assert_eq!(body["AssetId"], "02i000000000001AAA");
    }

    #[tokio::test]
    async fn existing_location_is_reused_instead_of_created() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        mount_case_create(&server, "500000000000003AAA").await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .and(query_param(
                "q",
                "SELECT Id FROM HeritageLocation__c WHERE Name = '31.600000,-7.900000' LIMIT 1",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSize": 1,
                "done": true,
                "records": [{"Id": "a0B000000000009AAA"}],
            })))
            .expect(1)
            .mount(&server)
            .await;

        // No location creation expected
        Mock::given(method("POST"))
            .and(path("/sobjects/HeritageLocation__c"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "a0B000000000010AAA",
                "success": true,
                "created": true,
            })))
            .expect(0)
            .mount(&server)
            .await;

        let mut alert = citizen_alert(Uuid::new_v4(), Uuid::new_v4());
        alert.latitude = Some(31.6);
        alert.longitude = Some(-7.9);

        let orchestrator = CaseOrchestrator::new(test_client(&server), InMemoryMappingRepo::new());
        orchestrator
            .create_citizen_case(&alert)
            .await
            .expect("case creation should succeed");

        let body = case_request_body(&server).await;
        assert_eq!(body["HeritageLocation__c"], "a0B000000000009AAA");
    }

    #[tokio::test]
    async fn new_location_is_created_when_no_match_exists() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        mount_case_create(&server, "500000000000004AAA").await;

        Mock::given(method("GET"))
            .and(path("/query"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalSize": 0,
                "done": true,
                "records": [],
            })))
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(path("/sobjects/HeritageLocation__c"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({
                "id": "a0B000000000011AAA",
                "success": true,
                "created": true,
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut alert = citizen_alert(Uuid::new_v4(), Uuid::new_v4());
        alert.latitude = Some(31.6);
        alert.longitude = Some(-7.9);

        let orchestrator = CaseOrchestrator::new(test_client(&server), InMemoryMappingRepo::new());
        orchestrator
            .create_citizen_case(&alert)
            .await
            .expect("case creation should succeed");
    }

    #[tokio::test]
    async fn claim_id_writes_the_claim_correlation_mapping() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        mount_case_create(&server, "500000000000005AAA").await;

        let claim_id = Uuid::new_v4();
        let mut alert = citizen_alert(Uuid::new_v4(), Uuid::new_v4());
        alert.claim_id = Some(claim_id);

        let orchestrator = CaseOrchestrator::new(test_client(&server), InMemoryMappingRepo::new());
        orchestrator
            .create_citizen_case(&alert)
            .await
            .expect("case creation should succeed");

        let mapping = orchestrator
            .mappings
            .get(LocalEntityType::Claim, claim_id)
            .expect("claim mapping should be written");
        assert_eq!(mapping.remote_entity_id, "500000000000005AAA");
    }

    #[tokio::test]
    async fn risk_case_prefers_the_embedded_asset_id_and_writes_no_mapping() {
        let server = MockServer::start().await;
        mount_token_endpoint(&server).await;
        mount_case_create(&server, "500000000000006AAA").await;

        let mut alert = risk_alert(Uuid::new_v4());
        alert.sf_asset_id = Some("02i000000000099AAA".to_string());

        let orchestrator = CaseOrchestrator::new(test_client(&server), InMemoryMappingRepo::new());
        orchestrator
            .create_risk_case(&alert)
            .await
            .expect("case creation should succeed");

        let body = case_request_body(&server).await;
        assert_eq!(body["AssetId"], "02i000000000099AAA");
        assert_eq!(body["Priority"], "High");
        assert!(orchestrator.mappings.upserts().is_empty());
    }

    #[test]
    fn severity_maps_to_priority() {
        assert_eq!(priority_for("CRITICAL"), "High");
        assert_eq!(priority_for("critical"), "High");
        assert_eq!(priority_for("WARNING"), "Medium");
        assert_eq!(priority_for("INFO"), "Medium");
    }

    #[test]
    fn risk_description_carries_the_telemetry_details() {
        let alert = risk_alert(Uuid::new_v4());
        let text = risk_description(&alert);

        assert!(text.contains("humidity reading of 91.5 %"));
        assert!(text.contains("SN-0042"));
        assert!(text.contains("Severity: CRITICAL"));
        assert!(text.contains("breach direction: above"));
        assert!(text.contains("min 20"));
        assert!(text.contains("max 80"));
    }
}
