//! Error types for the vocabs service.

use thiserror::Error;

/// Result type alias using the vocabs Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for vocabs operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Concept scheme not found
    #[error("Concept scheme not found: {0}")]
    SchemeNotFound(uuid::Uuid),

    /// Concept not found
    #[error("Concept not found: {0}")]
    ConceptNotFound(uuid::Uuid),

    /// User not found
    #[error("User not found: {0}")]
    UserNotFound(uuid::Uuid),

    /// Cycle detected in the broader-concept chain
    #[error("Cycle detected in concept hierarchy at: {0}")]
    CycleDetected(uuid::Uuid),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Authentication failed
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Forbidden (authenticated but not authorized)
    #[error("Forbidden: {0}")]
    Forbidden(String),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::NotFound("test resource".to_string());
        assert_eq!(err.to_string(), "Not found: test resource");
    }

    #[test]
    fn test_error_display_scheme_not_found() {
        let id = Uuid::nil();
        let err = Error::SchemeNotFound(id);
        assert_eq!(err.to_string(), format!("Concept scheme not found: {}", id));
    }

    #[test]
    fn test_error_display_concept_not_found() {
        let id = Uuid::new_v4();
        let err = Error::ConceptNotFound(id);
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_cycle_detected() {
        let id = Uuid::new_v4();
        let err = Error::CycleDetected(id);
        assert!(err
            .to_string()
            .starts_with("Cycle detected in concept hierarchy at:"));
        assert!(err.to_string().contains(&id.to_string()));
    }

    #[test]
    fn test_error_display_forbidden() {
        let err = Error::Forbidden("missing change permission".to_string());
        assert_eq!(err.to_string(), "Forbidden: missing change permission");
    }

    #[test]
    fn test_from_serde_json_error() {
        let json_err = serde_json::from_str::<i32>("not a number");
        let err: Error = json_err.unwrap_err().into();
        match err {
            Error::Serialization(msg) => assert!(!msg.is_empty()),
            _ => panic!("Expected Serialization error"),
        }
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send<T: Send>() {}
        fn assert_sync<T: Sync>() {}

        assert_send::<Error>();
        assert_sync::<Error>();
    }
}
