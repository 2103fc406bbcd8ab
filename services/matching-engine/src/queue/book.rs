//! The set of buckets, one per difficulty

use types::difficulty::Difficulty;
use types::ids::UserId;
use types::request::MatchRequest;

use super::bucket::MatchQueue;

/// One independent [`MatchQueue`] per difficulty
#[derive(Debug, Clone)]
pub struct QueueBook {
    easy: MatchQueue,
    medium: MatchQueue,
    hard: MatchQueue,
}

impl QueueBook {
    pub fn new() -> Self {
        Self {
            easy: MatchQueue::new(Difficulty::Easy),
            medium: MatchQueue::new(Difficulty::Medium),
            hard: MatchQueue::new(Difficulty::Hard),
        }
    }

    pub fn bucket(&self, difficulty: Difficulty) -> &MatchQueue {
        match difficulty {
            Difficulty::Easy => &self.easy,
            Difficulty::Medium => &self.medium,
            Difficulty::Hard => &self.hard,
        }
    }

    pub fn bucket_mut(&mut self, difficulty: Difficulty) -> &mut MatchQueue {
        match difficulty {
            Difficulty::Easy => &mut self.easy,
            Difficulty::Medium => &mut self.medium,
            Difficulty::Hard => &mut self.hard,
        }
    }

    /// The bucket currently holding `user_id`, if any
    pub fn locate(&self, user_id: &UserId) -> Option<Difficulty> {
        Difficulty::ALL
            .into_iter()
            .find(|d| self.bucket(*d).contains(user_id))
    }

    /// Remove `user_id` from whichever bucket holds it
    pub fn remove_anywhere(&mut self, user_id: &UserId) -> Option<MatchRequest> {
        let difficulty = self.locate(user_id)?;
        self.bucket_mut(difficulty).remove_by_user_id(user_id)
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.locate(user_id).is_some()
    }

    /// Total waiting requests across all buckets
    pub fn total_len(&self) -> usize {
        Difficulty::ALL.iter().map(|d| self.bucket(*d).len()).sum()
    }
}

impl Default for QueueBook {
    fn default() -> Self {
        Self::new()
    }
}
