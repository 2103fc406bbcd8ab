//! Finalized session types

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::ids::{SessionId, UserId};

/// Coarse label for how close a match's skill difference was to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchQuality {
    Excellent,
    Good,
    Acceptable,
}

impl MatchQuality {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchQuality::Excellent => "excellent",
            MatchQuality::Good => "good",
            MatchQuality::Acceptable => "acceptable",
        }
    }
}

/// Immutable record of a finalized match
///
/// `matched_topics` is a non-empty subset of both participants' topics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub session_id: SessionId,
    pub participant_user_ids: [UserId; 2],
    pub matched_topics: Vec<String>,
    pub difficulty: Difficulty,
    pub match_quality: MatchQuality,
    pub created_at: i64, // Unix millis
}

impl Session {
    pub fn has_participant(&self, user_id: &UserId) -> bool {
        self.participant_user_ids.contains(user_id)
    }

    /// The other participant, if `user_id` is one of the two
    pub fn partner_of(&self, user_id: &UserId) -> Option<&UserId> {
        let [a, b] = &self.participant_user_ids;
        if a == user_id {
            Some(b)
        } else if b == user_id {
            Some(a)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> Session {
        Session {
            session_id: SessionId::new(),
            participant_user_ids: [UserId::new("u1"), UserId::new("u2")],
            matched_topics: vec!["arrays".to_string()],
            difficulty: Difficulty::Easy,
            match_quality: MatchQuality::Excellent,
            created_at: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_partner_of() {
        let s = session();
        assert_eq!(s.partner_of(&UserId::new("u1")), Some(&UserId::new("u2")));
        assert_eq!(s.partner_of(&UserId::new("u2")), Some(&UserId::new("u1")));
        assert_eq!(s.partner_of(&UserId::new("u3")), None);
    }

    #[test]
    fn test_session_serialization_shape() {
        let json = serde_json::to_value(session()).unwrap();
        assert_eq!(json["participantUserIds"][0], "u1");
        assert_eq!(json["matchQuality"], "excellent");
        assert_eq!(json["difficulty"], "easy");
    }
}
