pub mod client;
pub mod objects;
pub mod token;

use reqwest::StatusCode;
use turath_common::error::TurathError;

#[derive(Debug, thiserror::Error)]
pub enum SalesforceError {
    #[error("authentication failed: {0}")]
    Authentication(String),

    #[error("HTTP {status}: {body}")]
    Api { status: StatusCode, body: String },

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<SalesforceError> for TurathError {
    fn from(err: SalesforceError) -> Self {
        match err {
            SalesforceError::Authentication(msg) => TurathError::Authentication(msg),
            SalesforceError::Api { status, body } => TurathError::RemoteApi {
                status: status.as_u16(),
                message: body,
            },
            SalesforceError::Request(e) => TurathError::RemoteApi {
                status: 0,
                message: e.to_string(),
            },
            SalesforceError::Serialization(e) => TurathError::Internal(e.to_string()),
        }
    }
}

pub use client::SalesforceClient;
pub use token::{Clock, SystemClock, TokenCache};
