use uuid::Uuid;

use crate::salesforce::objects::{kinds, AssetPayload, AssetUpdate, LocationPayload};
use crate::salesforce::SalesforceClient;
use crate::sync::SyncError;
use turath_db::identity_map::{IdentityMapRepository, IdentityMapping, LocalEntityType, SyncStatus};
use turath_events::events::{BuildingCreated, BuildingUpdated};

/// Outcome of the pre-sync state check for one building.
#[derive(Debug)]
pub enum SyncDecision {
    /// No mapping exists; a remote Asset must be created.
    Create,
    /// A mapping exists; the remote Asset is patched in place.
    Update(IdentityMapping),
}

/// Everything needed to run the remote creation flow, whether it was
/// triggered by a creation event or synthesized from an update that
/// arrived first.
struct BuildingFacts {
    building_id: Uuid,
    code: String,
    name: String,
    address: Option<String>,
    description: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
    image_url: Option<String>,
}

impl From<&BuildingCreated> for BuildingFacts {
    fn from(event: &BuildingCreated) -> Self {
        Self {
            building_id: event.building_id,
            code: event.code.clone(),
            name: event.name.clone(),
            address: event.address.clone(),
            description: None,
            latitude: event.latitude,
            longitude: event.longitude,
            image_url: event.image_url.clone(),
        }
    }
}

impl From<&BuildingUpdated> for BuildingFacts {
    fn from(event: &BuildingUpdated) -> Self {
        Self {
            building_id: event.building_id,
            code: event.code.clone(),
            name: event.name.clone(),
            address: event.address.clone(),
            description: event.description.clone(),
            latitude: event.latitude,
            longitude: event.longitude,
            image_url: event.image_url.clone(),
        }
    }
}

/// Projects building registry events into remote Asset (and optional
/// Location) records, keeping the identity map as the idempotency guard.
pub struct BuildingSynchronizer<M> {
    client: SalesforceClient,
    mappings: M,
}

impl<M: IdentityMapRepository> BuildingSynchronizer<M> {
    pub fn new(client: SalesforceClient, mappings: M) -> Self {
        Self { client, mappings }
    }

    /// State check for one building, kept separate from the HTTP flows so
    /// it can be tested on its own.
    pub async fn decide(&self, building_id: Uuid) -> Result<SyncDecision, SyncError> {
        match self
            .mappings
            .find(LocalEntityType::Building, building_id)
            .await?
        {
            Some(mapping) => Ok(SyncDecision::Update(mapping)),
            None => Ok(SyncDecision::Create),
        }
    }

    pub async fn on_created(&self, event: &BuildingCreated) -> Result<(), SyncError> {
        if let Some(existing) = self
            .mappings
            .find(LocalEntityType::Building, event.building_id)
            .await?
        {
            // Duplicate delivery: the asset already exists remotely.
            tracing::info!(
                building_id = %event.building_id,
                asset_id = %existing.remote_entity_id,
                "building already synced, skipping duplicate creation event"
            );
            return Ok(());
        }

        self.create_remote(&BuildingFacts::from(event)).await
    }

    pub async fn on_updated(&self, event: &BuildingUpdated) -> Result<(), SyncError> {
        match self.decide(event.building_id).await? {
            SyncDecision::Update(mapping) => {
                let patch = AssetUpdate {
                    name: Some(event.name.clone()),
                    description: Some(merged_description(&BuildingFacts::from(event))),
                    image_url: event.image_url.clone(),
                };
                self.client
                    .update(kinds::ASSET, &mapping.remote_entity_id, &patch)
                    .await?;

                self.mappings
                    .upsert(
                        LocalEntityType::Building,
                        event.building_id,
                        &mapping.remote_entity_id,
                        SyncStatus::Synced,
                    )
                    .await?;

                tracing::info!(
                    building_id = %event.building_id,
                    asset_id = %mapping.remote_entity_id,
                    "building update synced"
                );
                Ok(())
            }
            SyncDecision::Create => {
                // Update arrived before the creation event; synthesize the
                // full creation flow from the update payload.
                tracing::warn!(
                    building_id = %event.building_id,
                    "update received for unsynced building, creating remote asset"
                );
                self.create_remote(&BuildingFacts::from(event)).await
            }
        }
    }

    /// Multi-step remote creation: optional Location first, then the
    /// Asset, then the mapping. The mapping is only written after both
    /// remote calls succeed, so a failed flow leaves no partial state.
    async fn create_remote(&self, facts: &BuildingFacts) -> Result<(), SyncError> {
        let location_id = match (facts.latitude, facts.longitude) {
            (Some(lat), Some(lon)) => {
                let id = self
                    .client
                    .create(kinds::LOCATION, &LocationPayload::new(lat, lon))
                    .await?;
                Some(id)
            }
            _ => None,
        };

        let payload = AssetPayload::new(&facts.name, &facts.code)
            .description(merged_description(facts))
            .location(location_id.clone())
            .image_url(facts.image_url.clone());

        let asset_id = self.client.create(kinds::ASSET, &payload).await?;

        self.mappings
            .upsert(
                LocalEntityType::Building,
                facts.building_id,
                &asset_id,
                SyncStatus::Synced,
            )
            .await?;

        tracing::info!(
            building_id = %facts.building_id,
            asset_id = %asset_id,
            location_id = ?location_id,
            "building synced"
        );
        Ok(())
    }
}

/// Human-readable merged text for the remote Asset description field.
fn merged_description(facts: &BuildingFacts) -> String {
    let mut lines = vec![format!("{} ({})", facts.name, facts.code)];
    if let Some(address) = &facts.address {
        lines.push(format!("Address: {address}"));
    }
    if let Some(description) = &facts.description {
        lines.push(description.clone());
    }
    lines.join("\n")
}
