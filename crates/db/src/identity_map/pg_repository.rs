use std::str::FromStr;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{postgres::PgRow, PgPool, Row};
use uuid::Uuid;

use crate::identity_map::models::{IdentityMapping, LocalEntityType, SyncStatus};
use crate::identity_map::repositories::IdentityMapRepository;
use turath_common::error::{TurathError, TurathResult};

#[derive(Clone)]
pub struct PgIdentityMapRepository {
    pool: PgPool,
}

impl PgIdentityMapRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn map_row(row: PgRow) -> TurathResult<IdentityMapping> {
        let type_raw: String = row.get("local_entity_type");
        let local_entity_type =
            LocalEntityType::from_str(&type_raw).map_err(TurathError::Internal)?;
        let status_raw: String = row.get("sync_status");
        let sync_status = SyncStatus::from_str(&status_raw).map_err(TurathError::Internal)?;

        Ok(IdentityMapping {
            local_entity_type,
            local_entity_id: row.get("local_entity_id"),
            remote_entity_id: row.get("remote_entity_id"),
            sync_status,
            last_sync_at: row.get("last_sync_at"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        })
    }
}

#[async_trait]
impl IdentityMapRepository for PgIdentityMapRepository {
    async fn find(
        &self,
        entity_type: LocalEntityType,
        local_id: Uuid,
    ) -> TurathResult<Option<IdentityMapping>> {
        let row = sqlx::query(
            "select local_entity_type, local_entity_id, remote_entity_id, sync_status, last_sync_at, created_at, updated_at
             from identity_mappings
             where local_entity_type = $1 and local_entity_id = $2",
        )
        .bind(entity_type.as_str())
        .bind(local_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TurathError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::map_row(r)?)),
            None => Ok(None),
        }
    }

    async fn find_by_remote_id(&self, remote_id: &str) -> TurathResult<Option<IdentityMapping>> {
        let row = sqlx::query(
            "select local_entity_type, local_entity_id, remote_entity_id, sync_status, last_sync_at, created_at, updated_at
             from identity_mappings
             where remote_entity_id = $1",
        )
        .bind(remote_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| TurathError::Database(e.to_string()))?;

        match row {
            Some(r) => Ok(Some(Self::map_row(r)?)),
            None => Ok(None),
        }
    }

    async fn upsert(
        &self,
        entity_type: LocalEntityType,
        local_id: Uuid,
        remote_id: &str,
        status: SyncStatus,
    ) -> TurathResult<IdentityMapping> {
        let now = Utc::now();
        let row = sqlx::query(
            "insert into identity_mappings
               (local_entity_type, local_entity_id, remote_entity_id, sync_status, last_sync_at, created_at, updated_at)
             values ($1, $2, $3, $4, $5, $5, $5)
             on conflict (local_entity_type, local_entity_id) do update
               set remote_entity_id = excluded.remote_entity_id,
                   sync_status = excluded.sync_status,
                   last_sync_at = excluded.last_sync_at,
                   updated_at = excluded.updated_at
             returning local_entity_type, local_entity_id, remote_entity_id, sync_status, last_sync_at, created_at, updated_at",
        )
        .bind(entity_type.as_str())
        .bind(local_id)
        .bind(remote_id)
        .bind(status.as_str())
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| TurathError::Database(e.to_string()))?;

        Self::map_row(row)
    }
}
