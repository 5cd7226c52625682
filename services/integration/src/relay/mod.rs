pub mod case_status;
pub mod external;
pub mod webhook;

pub use case_status::{CaseStatusRelay, KafkaRelayBus, RelayBus};
pub use external::ClaimStatusMessage;
pub use webhook::{router, CaseStatusWebhook};
