use thiserror::Error;

#[derive(Debug, Error)]
pub enum TurathError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("authentication error: {0}")]
    Authentication(String),

    #[error("remote API error ({status}): {message}")]
    RemoteApi { status: u16, message: String },

    #[error("publish error: {0}")]
    Publish(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type TurathResult<T> = Result<T, TurathError>;
