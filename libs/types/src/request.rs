//! Match request types
//!
//! `MatchSubmission` is the raw inbound form; `MatchRequest` is the
//! validated, normalized entry that lives in a queue bucket.

use serde::{Deserialize, Serialize};

use crate::difficulty::Difficulty;
use crate::ids::UserId;

/// Historical solved-question counts per difficulty
///
/// Missing fields deserialize as zero. Both `easy` and `easyCount`
/// spellings are accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionStats {
    #[serde(default, alias = "easyCount")]
    pub easy: u32,
    #[serde(default, alias = "mediumCount")]
    pub medium: u32,
    #[serde(default, alias = "hardCount")]
    pub hard: u32,
}

impl QuestionStats {
    pub fn new(easy: u32, medium: u32, hard: u32) -> Self {
        Self { easy, medium, hard }
    }
}

/// Inbound `submitMatchRequest` payload, before validation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSubmission {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub topics: Vec<String>,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub question_stats: QuestionStats,
}

impl MatchSubmission {
    /// Convenience constructor used by tests and tools
    pub fn new(
        user_id: impl Into<String>,
        topics: &[&str],
        difficulty: impl Into<String>,
        question_stats: QuestionStats,
    ) -> Self {
        Self {
            user_id: Some(user_id.into()),
            username: None,
            topics: topics.iter().map(|t| t.to_string()).collect(),
            difficulty: difficulty.into(),
            question_stats,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// A validated request waiting in (or moving between) queue buckets
///
/// Immutable once created. `topics` is non-empty, normalized and
/// de-duplicated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub user_id: UserId,
    pub username: Option<String>,
    pub topics: Vec<String>,
    pub difficulty: Difficulty,
    pub question_stats: QuestionStats,
    pub skill_score: u64,
    pub enqueued_at: i64, // Unix millis
}
