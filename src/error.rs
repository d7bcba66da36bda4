use thiserror::Error;

/// Ошибки обращения к API Яндекс.Расписаний
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("schedules API rejected the request ({status}): {message}")]
    Client { status: u16, message: String },
    #[error("schedules API server error ({status}): {message}")]
    Server { status: u16, message: String },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("malformed response: {0}")]
    Parse(String),
}

impl From<reqwest_middleware::Error> for ApiError {
    fn from(err: reqwest_middleware::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Parse(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("invalid record: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("telegram request failed: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LockError {
    #[error("maintenance lock is already held")]
    AlreadyHeld,
}
