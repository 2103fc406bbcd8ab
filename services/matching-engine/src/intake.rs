//! Request validation
//!
//! Turns a raw `MatchSubmission` into a `MatchRequest` or a
//! `ValidationError`. Invalid submissions never reach a bucket.

use types::difficulty::Difficulty;
use types::errors::ValidationError;
use types::ids::UserId;
use types::request::{MatchRequest, MatchSubmission};

use crate::scoring::{normalize_topics, skill};

/// Validate and normalize a submission received at `now` (Unix millis)
pub fn admit(submission: MatchSubmission, now: i64) -> Result<MatchRequest, ValidationError> {
    let user_id = submission
        .user_id
        .as_deref()
        .and_then(UserId::try_new)
        .ok_or(ValidationError::MissingUserId)?;

    let topics = normalize_topics(&submission.topics);
    if topics.is_empty() {
        return Err(ValidationError::EmptyTopics);
    }

    let difficulty: Difficulty = submission.difficulty.parse()?;

    let username = submission
        .username
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    Ok(MatchRequest {
        user_id,
        username,
        topics,
        difficulty,
        skill_score: skill::score(&submission.question_stats),
        question_stats: submission.question_stats,
        enqueued_at: now,
    })
}
