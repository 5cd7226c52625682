use thiserror::Error;

#[derive(Debug, Error)]
pub enum EventError {
    #[error("broker connection failed ({broker}): {cause}")]
    Connection { broker: String, cause: String },

    #[error("publish to {topic} failed: {cause}")]
    Publish { topic: String, cause: String },

    #[error("consume from {topic} failed: {cause}")]
    Consume { topic: String, cause: String },

    #[error("serialization failed for {event_type}: {cause}")]
    Serialization { event_type: String, cause: String },

    #[error("invalid envelope: {0}")]
    InvalidEnvelope(String),
}
