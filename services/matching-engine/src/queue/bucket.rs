//! Per-difficulty match queue
//!
//! Entries keep their arrival order; the matcher scans the whole queue
//! rather than popping from the front, so this is "FIFO-ish". Priority
//! requeues go to the front. Removal by user never reorders the remaining
//! entries.

use std::collections::VecDeque;
use types::difficulty::Difficulty;
use types::ids::UserId;
use types::request::MatchRequest;

/// Waiting match requests for one difficulty
#[derive(Debug, Clone)]
pub struct MatchQueue {
    difficulty: Difficulty,
    entries: VecDeque<MatchRequest>,
}

impl MatchQueue {
    /// Create a new empty bucket
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            difficulty,
            entries: VecDeque::new(),
        }
    }

    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    /// Append a request at the back
    ///
    /// Returns false (and leaves the queue untouched) if the user is
    /// already waiting here.
    pub fn enqueue(&mut self, request: MatchRequest) -> bool {
        if self.contains(&request.user_id) {
            return false;
        }
        self.entries.push_back(request);
        true
    }

    /// Insert a request at the front (priority requeue)
    pub fn enqueue_front(&mut self, request: MatchRequest) -> bool {
        if self.contains(&request.user_id) {
            return false;
        }
        self.entries.push_front(request);
        true
    }

    /// Remove a user's request, preserving the order of the others
    ///
    /// Removing an absent user returns None; it is not an error.
    pub fn remove_by_user_id(&mut self, user_id: &UserId) -> Option<MatchRequest> {
        let position = self.position(user_id)?;
        self.entries.remove(position)
    }

    /// Remove two distinct users together, or neither
    pub fn remove_pair(
        &mut self,
        first: &UserId,
        second: &UserId,
    ) -> Option<(MatchRequest, MatchRequest)> {
        if first == second || !self.contains(first) || !self.contains(second) {
            return None;
        }
        let a = self.remove_by_user_id(first)?;
        let b = self.remove_by_user_id(second)?;
        Some((a, b))
    }

    pub fn get(&self, user_id: &UserId) -> Option<&MatchRequest> {
        self.entries.iter().find(|entry| &entry.user_id == user_id)
    }

    pub fn contains(&self, user_id: &UserId) -> bool {
        self.get(user_id).is_some()
    }

    /// Zero-based position of a user in scan order
    pub fn position(&self, user_id: &UserId) -> Option<usize> {
        self.entries.iter().position(|entry| &entry.user_id == user_id)
    }

    /// Entries in scan order
    pub fn iter(&self) -> impl Iterator<Item = &MatchRequest> {
        self.entries.iter()
    }

    /// Owned copy of the entries in scan order
    pub fn snapshot(&self) -> Vec<MatchRequest> {
        self.entries.iter().cloned().collect()
    }

    /// User ids in scan order
    pub fn user_ids(&self) -> Vec<UserId> {
        self.entries.iter().map(|entry| entry.user_id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
