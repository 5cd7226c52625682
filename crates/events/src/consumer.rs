use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::Message;
use tracing::{debug, error, info};

use crate::envelope::EventEnvelope;
use crate::error::EventError;
use crate::event::Event;

/// Handler for events of a specific type.
///
/// Returning `Err` leaves the offset uncommitted, so the broker redelivers
/// the event; there is no in-process retry.
#[async_trait]
pub trait EventHandler<E: Event>: Send + Sync + 'static {
    async fn handle(
        &self,
        envelope: EventEnvelope<E>,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Kafka consumer for a single consumer group.
pub struct EventConsumer {
    consumer: StreamConsumer,
    consumer_group: String,
}

impl EventConsumer {
    pub fn new(
        bootstrap_servers: &str,
        client_id: &str,
        consumer_group: impl Into<String>,
    ) -> Result<Self, EventError> {
        let consumer_group = consumer_group.into();

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", bootstrap_servers)
            .set("client.id", client_id)
            .set("group.id", &consumer_group)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "false")
            .set("session.timeout.ms", "30000")
            .create()
            .map_err(|e| EventError::Connection {
                broker: bootstrap_servers.to_string(),
                cause: e.to_string(),
            })?;

        info!(consumer_group, bootstrap_servers, "event consumer created");

        Ok(Self {
            consumer,
            consumer_group,
        })
    }

    /// Bind this consumer to one event type and handler.
    pub fn subscribe<E, H>(self, handler: H) -> Result<TypedConsumer<E, H>, EventError>
    where
        E: Event,
        H: EventHandler<E>,
    {
        self.consumer
            .subscribe(&[E::TOPIC])
            .map_err(|e| EventError::Consume {
                topic: E::TOPIC.to_string(),
                cause: e.to_string(),
            })?;

        info!(topic = E::TOPIC, "subscribed");

        Ok(TypedConsumer {
            consumer: self.consumer,
            consumer_group: self.consumer_group,
            handler: Arc::new(handler),
            _phantom: PhantomData,
        })
    }
}

/// A consumer bound to a specific event type and handler.
pub struct TypedConsumer<E: Event, H: EventHandler<E>> {
    consumer: StreamConsumer,
    consumer_group: String,
    handler: Arc<H>,
    _phantom: PhantomData<E>,
}

impl<E: Event, H: EventHandler<E>> TypedConsumer<E, H> {
    /// Run the consumer loop until the stream ends.
    ///
    /// Offsets are committed only after the handler succeeds; a failed
    /// handler leaves the message for the broker's redelivery.
    pub async fn run(self) -> Result<(), EventError> {
        info!(
            topic = E::TOPIC,
            consumer_group = %self.consumer_group,
            "consumer loop started"
        );

        let mut stream = self.consumer.stream();

        while let Some(result) = stream.next().await {
            let message = match result {
                Ok(m) => m,
                Err(e) => {
                    error!(topic = E::TOPIC, error = %e, "error receiving message");
                    continue;
                }
            };

            let payload = match message.payload() {
                Some(p) => p,
                None => {
                    error!(topic = E::TOPIC, "empty payload, skipping");
                    let _ = self.consumer.commit_message(&message, CommitMode::Async);
                    continue;
                }
            };

            let envelope = match EventEnvelope::<E>::from_json_bytes(payload) {
                Ok(env) => env,
                Err(e) => {
                    // Malformed messages can never succeed; commit so they
                    // are not redelivered forever.
                    error!(topic = E::TOPIC, error = %e, "undeliverable message, skipping");
                    let _ = self.consumer.commit_message(&message, CommitMode::Async);
                    continue;
                }
            };

            let event_id = envelope.event_id;
            debug!(topic = E::TOPIC, event_id = %event_id, "event received");

            match self.handler.handle(envelope).await {
                Ok(()) => {
                    self.consumer
                        .commit_message(&message, CommitMode::Async)
                        .map_err(|e| EventError::Consume {
                            topic: E::TOPIC.to_string(),
                            cause: e.to_string(),
                        })?;
                }
                Err(e) => {
                    // Offset not committed: the broker redelivers.
                    error!(topic = E::TOPIC, event_id = %event_id, error = %e, "handler failed");
                }
            }
        }

        info!(topic = E::TOPIC, "consumer loop ended");
        Ok(())
    }
}
