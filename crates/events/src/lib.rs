pub mod consumer;
pub mod envelope;
pub mod error;
pub mod event;
pub mod events;
pub mod producer;

pub use consumer::{EventConsumer, EventHandler, TypedConsumer};
pub use envelope::EventEnvelope;
pub use error::EventError;
pub use event::Event;
pub use producer::EventProducer;
