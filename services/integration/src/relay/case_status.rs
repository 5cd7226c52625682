use async_trait::async_trait;
use uuid::Uuid;

use crate::relay::external::ClaimStatusMessage;
use crate::relay::webhook::CaseStatusWebhook;
use turath_common::error::{TurathError, TurathResult};
use turath_db::identity_map::{IdentityMapRepository, LocalEntityType};
use turath_events::events::CaseStatusChanged;
use turath_events::{EventEnvelope, EventError, EventProducer};

const SOURCE: &str = "turath-integration";

/// The two publish targets of the relay, behind a trait so the relay
/// logic is testable without brokers.
#[async_trait]
pub trait RelayBus: Send + Sync {
    async fn publish_internal(
        &self,
        envelope: &EventEnvelope<CaseStatusChanged>,
    ) -> Result<(), EventError>;

    /// Keyed publish so all updates for one claim share a partition.
    async fn publish_external(
        &self,
        key: &str,
        message: &ClaimStatusMessage,
    ) -> Result<(), EventError>;
}

pub struct KafkaRelayBus {
    internal: EventProducer,
    external: EventProducer,
    external_topic: String,
}

impl KafkaRelayBus {
    pub fn new(internal: EventProducer, external: EventProducer, external_topic: String) -> Self {
        Self {
            internal,
            external,
            external_topic,
        }
    }
}

#[async_trait]
impl RelayBus for KafkaRelayBus {
    async fn publish_internal(
        &self,
        envelope: &EventEnvelope<CaseStatusChanged>,
    ) -> Result<(), EventError> {
        self.internal.publish(envelope).await
    }

    async fn publish_external(
        &self,
        key: &str,
        message: &ClaimStatusMessage,
    ) -> Result<(), EventError> {
        self.external
            .publish_keyed(&self.external_topic, key, message)
            .await
    }
}

/// Relays CRM case status webhooks: always republishes on the internal
/// bus, then resolves the reverse claim correlation and, when one exists,
/// publishes the translated message on the external bus.
pub struct CaseStatusRelay<M, B> {
    mappings: M,
    bus: B,
}

impl<M: IdentityMapRepository, B: RelayBus> CaseStatusRelay<M, B> {
    pub fn new(mappings: M, bus: B) -> Self {
        Self { mappings, bus }
    }

    /// An error from the internal publish propagates (the webhook caller
    /// retries the whole delivery); everything after it is best-effort
    /// and never rolls back step one.
    pub async fn relay(&self, webhook: CaseStatusWebhook) -> TurathResult<()> {
        let event = CaseStatusChanged {
            message_type: webhook.message_type,
            case_id: webhook.case_id,
            timestamp: webhook.timestamp,
            status: webhook.status,
            resolution: webhook.resolution,
        };
        let envelope = EventEnvelope::new(event, SOURCE, Uuid::new_v4());

        self.bus
            .publish_internal(&envelope)
            .await
            .map_err(|e| TurathError::Publish(e.to_string()))?;

        let event = &envelope.payload;

        let mapping = match self.mappings.find_by_remote_id(&event.case_id).await {
            Ok(Some(m)) if m.local_entity_type == LocalEntityType::Claim => m,
            Ok(Some(m)) => {
                tracing::warn!(
                    case_id = %event.case_id,
                    entity_type = ?m.local_entity_type,
                    "remote id maps to a non-claim entity, external relay skipped"
                );
                return Ok(());
            }
            Ok(None) => {
                // No prior claim correlation: nothing external to notify.
                tracing::info!(
                    case_id = %event.case_id,
                    "no claim correlation for case, external relay skipped"
                );
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(
                    case_id = %event.case_id,
                    error = %e,
                    "reverse lookup failed, external relay skipped"
                );
                return Ok(());
            }
        };

        let claim_id = mapping.local_entity_id;
        let message = ClaimStatusMessage::from_case_event(claim_id, event);

        if let Err(e) = self
            .bus
            .publish_external(&claim_id.to_string(), &message)
            .await
        {
            tracing::warn!(
                case_id = %event.case_id,
                claim_id = %claim_id,
                error = %e,
                "external publish failed, internal republish stands"
            );
            return Ok(());
        }

        tracing::info!(
            case_id = %event.case_id,
            claim_id = %claim_id,
            new_status = %event.status.new_status,
            "case status relayed to claims bus"
        );
        Ok(())
    }
}
