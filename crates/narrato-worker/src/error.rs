//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Notification failed: {0}")]
    NotificationFailed(String),

    /// Media errors keep their own message; it becomes the job's failure text.
    #[error(transparent)]
    Media(#[from] narrato_media::MediaError),

    #[error(transparent)]
    Storage(#[from] narrato_storage::StorageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn notification_failed(msg: impl Into<String>) -> Self {
        Self::NotificationFailed(msg.into())
    }
}
