//! Event structures for the matching engine
//!
//! `MatchEvent` is what the notifier pushes to a connected user.
//! `SessionHandoff` is what the collaboration system receives once a
//! session is finalized.

use serde::{Deserialize, Serialize};
use types::difficulty::Difficulty;
use types::ids::{SessionId, UserId};
use types::session::{MatchQuality, Session};

/// Out-of-band notification for a single user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchEvent {
    /// Tentative match, awaiting confirmation from both sides
    #[serde(rename_all = "camelCase")]
    MatchFound {
        session_id: SessionId,
        partner_id: UserId,
        partner_username: Option<String>,
        matched_topics: Vec<String>,
        difficulty: Difficulty,
        match_quality: MatchQuality,
        skill_difference: u64,
        /// Milliseconds left to confirm
        time_to_confirm: u64,
    },

    #[serde(rename_all = "camelCase")]
    PartnerConfirmed { session_id: SessionId },

    /// Final: both sides accepted
    #[serde(rename_all = "camelCase")]
    MatchConfirmed {
        session_id: SessionId,
        partner_id: UserId,
        matched_topics: Vec<String>,
        difficulty: Difficulty,
        match_quality: MatchQuality,
    },

    #[serde(rename_all = "camelCase")]
    MatchRejected { session_id: SessionId, message: String },

    #[serde(rename_all = "camelCase")]
    ConfirmationTimeout { session_id: SessionId },

    /// Total wait elapsed without a match; the request was discarded
    #[serde(rename_all = "camelCase")]
    MatchTimeout { time_waited: u64 },

    Cancelled,
}

impl MatchEvent {
    /// Wire tag, for logging
    pub fn kind(&self) -> &'static str {
        match self {
            MatchEvent::MatchFound { .. } => "MATCH_FOUND",
            MatchEvent::PartnerConfirmed { .. } => "PARTNER_CONFIRMED",
            MatchEvent::MatchConfirmed { .. } => "MATCH_CONFIRMED",
            MatchEvent::MatchRejected { .. } => "MATCH_REJECTED",
            MatchEvent::ConfirmationTimeout { .. } => "CONFIRMATION_TIMEOUT",
            MatchEvent::MatchTimeout { .. } => "MATCH_TIMEOUT",
            MatchEvent::Cancelled => "CANCELLED",
        }
    }
}

/// Payload for the external collaboration system on finalize
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionHandoff {
    pub session_id: SessionId,
    pub participant_user_ids: [UserId; 2],
    pub matched_topics: Vec<String>,
    pub difficulty: Difficulty,
}

impl From<&Session> for SessionHandoff {
    fn from(session: &Session) -> Self {
        Self {
            session_id: session.session_id,
            participant_user_ids: session.participant_user_ids.clone(),
            matched_topics: session.matched_topics.clone(),
            difficulty: session.difficulty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_found_wire_shape() {
        let event = MatchEvent::MatchFound {
            session_id: SessionId::new(),
            partner_id: UserId::new("u2"),
            partner_username: Some("bob".to_string()),
            matched_topics: vec!["arrays".to_string()],
            difficulty: Difficulty::Easy,
            match_quality: MatchQuality::Excellent,
            skill_difference: 0,
            time_to_confirm: 30_000,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "MATCH_FOUND");
        assert_eq!(json["partnerId"], "u2");
        assert_eq!(json["matchQuality"], "excellent");
        assert_eq!(json["timeToConfirm"], 30_000);
        assert_eq!(event.kind(), "MATCH_FOUND");
    }

    #[test]
    fn test_unit_variant_wire_shape() {
        let json = serde_json::to_string(&MatchEvent::Cancelled).unwrap();
        assert_eq!(json, r#"{"type":"CANCELLED"}"#);
    }

    #[test]
    fn test_timeout_wire_shape() {
        let json = serde_json::to_value(MatchEvent::MatchTimeout { time_waited: 120_000 }).unwrap();
        assert_eq!(json["type"], "MATCH_TIMEOUT");
        assert_eq!(json["timeWaited"], 120_000);
    }
}
