//! Shared test doubles for synchronizer and relay tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use turath_common::error::{TurathError, TurathResult};
use turath_db::identity_map::{
    IdentityMapRepository, IdentityMapping, LocalEntityType, SyncStatus,
};

/// In-memory identity map with the same upsert semantics as the Pg
/// implementation, plus call recording and failure injection.
#[derive(Default)]
pub struct InMemoryMappingRepo {
    rows: Mutex<HashMap<(LocalEntityType, Uuid), IdentityMapping>>,
    upsert_calls: Mutex<Vec<(LocalEntityType, Uuid, String)>>,
    fail_lookups: bool,
}

impl InMemoryMappingRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_lookups() -> Self {
        Self {
            fail_lookups: true,
            ..Self::default()
        }
    }

    pub fn with_mapping(self, entity_type: LocalEntityType, local_id: Uuid, remote_id: &str) -> Self {
        let mapping = IdentityMapping {
            local_entity_type: entity_type,
            local_entity_id: local_id,
            remote_entity_id: remote_id.to_string(),
            sync_status: SyncStatus::Synced,
            last_sync_at: Utc::now(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.rows
            .lock()
            .expect("rows lock poisoned")
            .insert((entity_type, local_id), mapping);
        self
    }

    pub fn upserts(&self) -> Vec<(LocalEntityType, Uuid, String)> {
        self.upsert_calls.lock().expect("calls lock poisoned").clone()
    }

    pub fn get(&self, entity_type: LocalEntityType, local_id: Uuid) -> Option<IdentityMapping> {
        self.rows
            .lock()
            .expect("rows lock poisoned")
            .get(&(entity_type, local_id))
            .cloned()
    }
}

#[async_trait]
impl IdentityMapRepository for InMemoryMappingRepo {
    async fn find(
        &self,
        entity_type: LocalEntityType,
        local_id: Uuid,
    ) -> TurathResult<Option<IdentityMapping>> {
        if self.fail_lookups {
            return Err(TurathError::Database("injected failure".to_string()));
        }
        Ok(self.get(entity_type, local_id))
    }

    async fn find_by_remote_id(&self, remote_id: &str) -> TurathResult<Option<IdentityMapping>> {
        if self.fail_lookups {
            return Err(TurathError::Database("injected failure".to_string()));
        }
        Ok(self
            .rows
            .lock()
            .expect("rows lock poisoned")
            .values()
            .find(|m| m.remote_entity_id == remote_id)
            .cloned())
    }

    async fn upsert(
        &self,
        entity_type: LocalEntityType,
        local_id: Uuid,
        remote_id: &str,
        status: SyncStatus,
    ) -> TurathResult<IdentityMapping> {
        self.upsert_calls
            .lock()
            .expect("calls lock poisoned")
            .push((entity_type, local_id, remote_id.to_string()));

        let now = Utc::now();
        let mut rows = self.rows.lock().expect("rows lock poisoned");
        let mapping = rows
            .entry((entity_type, local_id))
            .and_modify(|m| {
                m.remote_entity_id = remote_id.to_string();
                m.sync_status = status;
                m.last_sync_at = now;
                m.updated_at = now;
            })
            .or_insert(IdentityMapping {
                local_entity_type: entity_type,
                local_entity_id: local_id,
                remote_entity_id: remote_id.to_string(),
                sync_status: status,
                last_sync_at: now,
                created_at: now,
                updated_at: now,
            });
        Ok(mapping.clone())
    }
}
