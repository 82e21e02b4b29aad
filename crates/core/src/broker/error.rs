use thiserror::Error;

/// Errors that can occur while talking to the message broker.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("Broker connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Broker operation failed: {0}")]
    OperationFailed(String),
    #[error("Topic already has a subscriber: {0}")]
    AlreadySubscribed(String),
}

/// Result type for broker operations.
pub type Result<T> = std::result::Result<T, BrokerError>;
