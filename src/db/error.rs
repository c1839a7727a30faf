use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("migration error: {0}")]
    Migration(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("invalid store url: {0}")]
    InvalidUrl(String),

    #[error("unsupported sql dialect: {0}")]
    UnsupportedDialect(String),

    #[error("invalid key: {0}")]
    InvalidKey(String),

    #[error("store is not open")]
    NotOpen,

    #[error("store task failed: {0}")]
    Task(String),
}

pub type StoreResult<T> = Result<T, StoreError>;
