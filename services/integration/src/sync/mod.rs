pub mod building;
pub mod case;

use crate::salesforce::SalesforceError;
use turath_common::error::TurathError;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    Salesforce(#[from] SalesforceError),

    #[error(transparent)]
    Store(#[from] TurathError),
}

pub use building::{BuildingSynchronizer, SyncDecision};
pub use case::CaseOrchestrator;
