pub mod env;
pub mod tracing_init;

pub use env::{IntegrationConfig, SalesforceConfig};
pub use tracing_init::init_tracing;
