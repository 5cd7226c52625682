use serde::{de::DeserializeOwned, Serialize};

/// A domain event that can be published to and consumed from the bus.
///
/// Events of one type share a topic; the ordering key decides which
/// partition a given instance lands on, so events with the same key are
/// delivered in order.
pub trait Event: Serialize + DeserializeOwned + Send + Sync + 'static {
    /// Topic this event type is published to and consumed from.
    const TOPIC: &'static str;

    /// Fully qualified event type name, stored in the envelope and the
    /// `event-type` message header.
    const EVENT_TYPE: &'static str;

    /// Partition/ordering key for this event instance.
    fn key(&self) -> String;
}
