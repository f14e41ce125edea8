use crate::domain::chat::UserId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BotError {
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("User {actor} is not authorized to resolve orders")]
    AuthorizationError { actor: UserId },
    #[error("Malformed callback payload: {0:?}")]
    MalformedCallback(String),
    #[error("Storage error: {0}")]
    StorageError(Box<dyn std::error::Error + Send + Sync>),
    #[error("Transport error: {0}")]
    TransportError(String),
    #[error("Configuration error: {0}")]
    ConfigError(String),
    #[error("Could not decode update: {0}")]
    DecodeError(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl From<sqlx::Error> for BotError {
    fn from(err: sqlx::Error) -> Self {
        BotError::StorageError(Box::new(err))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for BotError {
    fn from(err: rocksdb::Error) -> Self {
        BotError::StorageError(Box::new(err))
    }
}

pub type Result<T> = std::result::Result<T, BotError>;
