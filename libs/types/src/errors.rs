//! Error types for the match-making service
//!
//! Error taxonomy using thiserror. Delivery and collaboration failures are
//! not represented here: they are logged and swallowed by the caller.

use thiserror::Error;

/// Top-level match-making error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MatchError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Session not found: {session_id}")]
    SessionNotFound { session_id: String },

    #[error("User {user_id} is not a participant of session {session_id}")]
    NotParticipant { user_id: String, session_id: String },

    #[error("User {user_id} already has a waiting match request")]
    AlreadyQueued { user_id: String },

    #[error("User {user_id} is confirming session {session_id}")]
    AlreadyConfirming { user_id: String, session_id: String },
}

impl MatchError {
    /// Whether this error means "no matching state" (no side effects happened)
    pub fn is_not_found(&self) -> bool {
        matches!(self, MatchError::SessionNotFound { .. })
    }
}

/// Malformed request, rejected synchronously and never enqueued
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("userId is required")]
    MissingUserId,

    #[error("at least one non-blank topic is required")]
    EmptyTopics,

    #[error("invalid difficulty: {0:?} (expected easy, medium or hard)")]
    InvalidDifficulty(String),

    #[error("a session needs two distinct participants")]
    DuplicateParticipants,

    #[error("matched topics must not be empty")]
    EmptyMatchedTopics,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::InvalidDifficulty("expert".to_string());
        assert!(err.to_string().contains("expert"));
    }

    #[test]
    fn test_match_error_from_validation() {
        let err: MatchError = ValidationError::EmptyTopics.into();
        assert!(matches!(err, MatchError::Validation(ValidationError::EmptyTopics)));
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_not_participant_display() {
        let err = MatchError::NotParticipant {
            user_id: "u3".to_string(),
            session_id: "s1".to_string(),
        };
        assert_eq!(err.to_string(), "User u3 is not a participant of session s1");
    }
}
