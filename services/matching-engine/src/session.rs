//! Session factory and registry
//!
//! Issues session ids and stores finalized sessions immutably.

use std::collections::HashMap;
use types::difficulty::Difficulty;
use types::errors::ValidationError;
use types::ids::{SessionId, UserId};
use types::session::{MatchQuality, Session};

/// Creates and looks up finalized sessions
#[derive(Debug, Default)]
pub struct SessionFactory {
    sessions: HashMap<SessionId, Session>,
}

impl SessionFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fresh id, never equal to a registered session
    pub fn issue_id(&self) -> SessionId {
        loop {
            let id = SessionId::new();
            if !self.sessions.contains_key(&id) {
                return id;
            }
        }
    }

    /// Register a finalized session
    ///
    /// Idempotent: if `session_id` is already registered the existing
    /// record is returned unchanged.
    pub fn create_session(
        &mut self,
        session_id: SessionId,
        participants: [UserId; 2],
        matched_topics: Vec<String>,
        difficulty: Difficulty,
        match_quality: MatchQuality,
        now: i64,
    ) -> Result<&Session, ValidationError> {
        if participants[0] == participants[1] {
            return Err(ValidationError::DuplicateParticipants);
        }
        if matched_topics.is_empty() {
            return Err(ValidationError::EmptyMatchedTopics);
        }

        Ok(self.sessions.entry(session_id).or_insert_with(|| Session {
            session_id,
            participant_user_ids: participants,
            matched_topics,
            difficulty,
            match_quality,
            created_at: now,
        }))
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> [UserId; 2] {
        [UserId::new("u1"), UserId::new("u2")]
    }

    #[test]
    fn test_create_and_get() {
        let mut factory = SessionFactory::new();
        let id = factory.issue_id();
        factory
            .create_session(id, pair(), vec!["arrays".into()], Difficulty::Easy, MatchQuality::Good, 42)
            .unwrap();

        let session = factory.get(&id).unwrap();
        assert_eq!(session.created_at, 42);
        assert!(session.has_participant(&UserId::new("u2")));
    }

    #[test]
    fn test_create_is_idempotent() {
        let mut factory = SessionFactory::new();
        let id = factory.issue_id();
        factory
            .create_session(id, pair(), vec!["arrays".into()], Difficulty::Easy, MatchQuality::Good, 1)
            .unwrap();
        let again = factory
            .create_session(id, pair(), vec!["dp".into()], Difficulty::Hard, MatchQuality::Good, 2)
            .unwrap();

        assert_eq!(again.created_at, 1);
        assert_eq!(again.matched_topics, vec!["arrays".to_string()]);
        assert_eq!(factory.len(), 1);
    }

    #[test]
    fn test_rejects_invalid_sessions() {
        let mut factory = SessionFactory::new();
        let same = [UserId::new("u1"), UserId::new("u1")];
        assert_eq!(
            factory
                .create_session(factory.issue_id(), same, vec!["a".into()], Difficulty::Easy, MatchQuality::Good, 0)
                .unwrap_err(),
            ValidationError::DuplicateParticipants
        );
        assert_eq!(
            factory
                .create_session(factory.issue_id(), pair(), vec![], Difficulty::Easy, MatchQuality::Good, 0)
                .unwrap_err(),
            ValidationError::EmptyMatchedTopics
        );
        assert!(factory.is_empty());
    }

    #[test]
    fn test_issued_ids_unique() {
        let factory = SessionFactory::new();
        let ids: std::collections::HashSet<_> = (0..1000).map(|_| factory.issue_id()).collect();
        assert_eq!(ids.len(), 1000);
    }
}
