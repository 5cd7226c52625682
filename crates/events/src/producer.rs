use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::Serialize;
use tracing::debug;

use crate::envelope::EventEnvelope;
use crate::error::EventError;
use crate::event::Event;

/// Kafka producer for one bus (internal or external).
#[derive(Clone)]
pub struct EventProducer {
    producer: FutureProducer,
    bootstrap_servers: String,
}

impl EventProducer {
    pub fn new(bootstrap_servers: &str, client_id: &str) -> Result<Self, EventError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("client.id", client_id)
            .set("message.timeout.ms", "5000")
            .set("acks", "all")
            .create()
            .map_err(|e| EventError::Connection {
                broker: bootstrap_servers.to_string(),
                cause: e.to_string(),
            })?;

        tracing::info!(bootstrap_servers, client_id, "event producer created");

        Ok(Self {
            producer,
            bootstrap_servers: bootstrap_servers.to_string(),
        })
    }

    /// Publish an enveloped event to its topic, keyed per the payload and
    /// tagged with an `event-type` header.
    pub async fn publish<E: Event>(&self, envelope: &EventEnvelope<E>) -> Result<(), EventError> {
        let bytes = envelope.to_json_bytes()?;
        let key = envelope.key();

        let record = FutureRecord::to(E::TOPIC)
            .key(&key)
            .payload(&bytes)
            .headers(OwnedHeaders::new().insert(Header {
                key: "event-type",
                value: Some(E::EVENT_TYPE),
            }));

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| EventError::Publish {
                topic: E::TOPIC.to_string(),
                cause: e.to_string(),
            })?;

        debug!(
            topic = E::TOPIC,
            event_id = %envelope.event_id,
            key = %key,
            "event published"
        );
        Ok(())
    }

    /// Publish an arbitrary JSON message to a topic with an explicit key.
    ///
    /// Used for the external bus, whose messages are not enveloped and
    /// must be strictly ordered per key.
    pub async fn publish_keyed<T: Serialize>(
        &self,
        topic: &str,
        key: &str,
        message: &T,
    ) -> Result<(), EventError> {
        let bytes = serde_json::to_vec(message).map_err(|e| EventError::Serialization {
            event_type: topic.to_string(),
            cause: e.to_string(),
        })?;

        let record = FutureRecord::to(topic).key(key).payload(&bytes);

        self.producer
            .send(record, Duration::from_secs(5))
            .await
            .map_err(|(e, _)| EventError::Publish {
                topic: topic.to_string(),
                cause: e.to_string(),
            })?;

        debug!(topic, key, "keyed message published");
        Ok(())
    }

    pub fn bootstrap_servers(&self) -> &str {
        &self.bootstrap_servers
    }
}
