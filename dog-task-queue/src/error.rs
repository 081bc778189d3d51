use thiserror::Error;

/// Result type for the fallible edges of the queue (helpers, config, export)
pub type QueueResult<T> = Result<T, QueueError>;

/// Errors raised outside the push/release paths, which never fail
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    #[error("No tokio runtime available to drive async task")]
    NoRuntime,

    #[error("Invalid queue configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl QueueError {
    /// Create a configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }
}

#[cfg(feature = "json")]
impl From<serde_json::Error> for QueueError {
    fn from(err: serde_json::Error) -> Self {
        Self::SerializationError(err.to_string())
    }
}
