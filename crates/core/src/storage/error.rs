use thiserror::Error;

/// Errors that can occur during repository and document store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Invalid id: {0}")]
    InvalidId(String),
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),
    #[error("Query failed: {0}")]
    QueryFailed(String),
    #[error("Decode error: {0}")]
    Decode(String),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl RepositoryError {
    /// Returns true when the store itself is unavailable or rejected the operation.
    pub fn is_persistence(&self) -> bool {
        matches!(
            self,
            RepositoryError::ConnectionFailed(_) | RepositoryError::QueryFailed(_)
        )
    }

    /// Returns true when a stored document could not be cast into its record shape.
    pub fn is_decode(&self) -> bool {
        matches!(self, RepositoryError::Decode(_))
    }
}

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_invalid_id_display() {
        let error = RepositoryError::InvalidId("xyz".to_string());
        assert_eq!(error.to_string(), "Invalid id: xyz");
    }

    #[test]
    fn test_repository_error_connection_failed_display() {
        let error = RepositoryError::ConnectionFailed("timeout after 30s".to_string());
        assert_eq!(error.to_string(), "Connection failed: timeout after 30s");
    }

    #[test]
    fn test_repository_error_query_failed_display() {
        let error = RepositoryError::QueryFailed("no such table: goals".to_string());
        assert_eq!(error.to_string(), "Query failed: no such table: goals");
    }

    #[test]
    fn test_repository_error_decode_display() {
        let error = RepositoryError::Decode("missing field `amount`".to_string());
        assert_eq!(error.to_string(), "Decode error: missing field `amount`");
    }

    #[test]
    fn test_repository_error_invalid_data_display() {
        let error = RepositoryError::InvalidData("expected an object".to_string());
        assert_eq!(error.to_string(), "Invalid data: expected an object");
    }

    #[test]
    fn test_error_classes() {
        assert!(RepositoryError::ConnectionFailed(String::new()).is_persistence());
        assert!(RepositoryError::QueryFailed(String::new()).is_persistence());
        assert!(!RepositoryError::Decode(String::new()).is_persistence());
        assert!(RepositoryError::Decode(String::new()).is_decode());
        assert!(!RepositoryError::InvalidId(String::new()).is_decode());
    }
}
