use async_trait::async_trait;
use uuid::Uuid;

use crate::identity_map::models::{IdentityMapping, LocalEntityType, SyncStatus};
use turath_common::error::TurathResult;

#[async_trait]
pub trait IdentityMapRepository: Send + Sync {
    /// Look up the mapping for a local entity, if one has been recorded.
    async fn find(
        &self,
        entity_type: LocalEntityType,
        local_id: Uuid,
    ) -> TurathResult<Option<IdentityMapping>>;

    /// Reverse lookup by the remote record id alone.
    ///
    /// Well-defined because `remote_entity_id` carries a unique index
    /// across all entity types.
    async fn find_by_remote_id(&self, remote_id: &str) -> TurathResult<Option<IdentityMapping>>;

    /// Create or refresh the mapping for a local entity.
    ///
    /// Atomic per `(entity_type, local_id)`; calling it twice for the same
    /// key updates the existing row and never creates a duplicate.
    async fn upsert(
        &self,
        entity_type: LocalEntityType,
        local_id: Uuid,
        remote_id: &str,
        status: SyncStatus,
    ) -> TurathResult<IdentityMapping>;
}
