use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::case_status::{CaseStatusRelay, RelayBus};
use turath_common::types::ServiceInfo;
use turath_db::identity_map::IdentityMapRepository;
use turath_events::events::{CaseResolution, CaseStatusInfo};

/// Case status update pushed by the CRM.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseStatusWebhook {
    pub message_type: String,
    pub case_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: CaseStatusInfo,
    #[serde(default)]
    pub resolution: Option<CaseResolution>,
}

pub fn router<M, B>(relay: Arc<CaseStatusRelay<M, B>>) -> Router
where
    M: IdentityMapRepository + 'static,
    B: RelayBus + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/info", get(info))
        .route(
            "/webhooks/crm/case-status",
            post(receive_case_status::<M, B>),
        )
        .with_state(relay)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn info() -> Json<ServiceInfo> {
    Json(ServiceInfo::new("turath-integration"))
}

/// The CRM only needs to know whether the internal republish landed; the
/// external relay step never affects the response.
async fn receive_case_status<M, B>(
    State(relay): State<Arc<CaseStatusRelay<M, B>>>,
    Json(webhook): Json<CaseStatusWebhook>,
) -> impl IntoResponse
where
    M: IdentityMapRepository + 'static,
    B: RelayBus + 'static,
{
    let case_id = webhook.case_id.clone();

    match relay.relay(webhook).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({ "status": "accepted" })),
        ),
        Err(e) => {
            tracing::error!(case_id = %case_id, error = %e, "webhook relay failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "status": "error" })),
            )
        }
    }
}
