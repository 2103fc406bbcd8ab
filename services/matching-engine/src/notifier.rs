//! Notification capability
//!
//! The engine only knows this trait. Delivery is fire-and-forget: a failed
//! delivery never rolls back the state transition that produced the event.

use dashmap::{DashMap, DashSet};
use types::ids::UserId;

use crate::events::MatchEvent;

/// Delivers events to a user if they are currently reachable
///
/// Implementations must not block. Returns whether the event was handed
/// to a live connection.
pub trait Notifier: Send + Sync {
    fn try_deliver(&self, user_id: &UserId, event: &MatchEvent) -> bool;
}

/// In-memory notifier that records every delivered event per user
///
/// Users marked offline are unreachable: their events are dropped and
/// `try_deliver` returns false.
#[derive(Debug, Default)]
pub struct MemoryNotifier {
    inbox: DashMap<UserId, Vec<MatchEvent>>,
    offline: DashSet<UserId>,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_offline(&self, user_id: &UserId) {
        self.offline.insert(user_id.clone());
    }

    pub fn set_online(&self, user_id: &UserId) {
        self.offline.remove(user_id);
    }

    /// Events delivered to `user_id`, oldest first
    pub fn events_for(&self, user_id: &UserId) -> Vec<MatchEvent> {
        self.inbox
            .get(user_id)
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Last event delivered to `user_id`
    pub fn last_event(&self, user_id: &UserId) -> Option<MatchEvent> {
        self.inbox.get(user_id).and_then(|events| events.last().cloned())
    }

    /// Drain and return everything delivered to `user_id`
    pub fn take(&self, user_id: &UserId) -> Vec<MatchEvent> {
        self.inbox
            .get_mut(user_id)
            .map(|mut events| std::mem::take(&mut *events))
            .unwrap_or_default()
    }

    /// How many events of a given wire kind reached `user_id`
    pub fn count_kind(&self, user_id: &UserId, kind: &str) -> usize {
        self.inbox
            .get(user_id)
            .map(|events| events.iter().filter(|e| e.kind() == kind).count())
            .unwrap_or(0)
    }
}

impl Notifier for MemoryNotifier {
    fn try_deliver(&self, user_id: &UserId, event: &MatchEvent) -> bool {
        if self.offline.contains(user_id) {
            return false;
        }
        self.inbox
            .entry(user_id.clone())
            .or_default()
            .push(event.clone());
        true
    }
}
