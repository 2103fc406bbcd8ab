//! Timeout bookkeeping
//!
//! Timers are deadlines keyed by the entity they protect: one wait timer
//! per queued user, one confirmation timer per pending session. Firing
//! happens when the engine is ticked, through the same `&mut` path as any
//! other transition. A fired timer is removed, so cancelling it afterwards
//! is a silent no-op.

use std::collections::HashMap;
use std::hash::Hash;
use types::ids::{SessionId, UserId};

use crate::config::MatchConfig;

/// A single armed timer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    /// When the timer was armed (Unix millis)
    pub armed_at: i64,
    /// When it fires (Unix millis)
    pub deadline: i64,
}

/// Deadline registry with at most one timer per key
#[derive(Debug, Clone)]
pub struct TimerRegistry<K> {
    timers: HashMap<K, Timer>,
}

impl<K: Eq + Hash + Ord + Clone> TimerRegistry<K> {
    pub fn new() -> Self {
        Self {
            timers: HashMap::new(),
        }
    }

    /// Arm a timer for `key`, replacing any existing one
    ///
    /// Returns the replaced timer, if there was one.
    pub fn schedule(&mut self, key: K, now: i64, duration_ms: u64) -> Option<Timer> {
        let deadline = now.saturating_add(i64::try_from(duration_ms).unwrap_or(i64::MAX));
        self.timers.insert(
            key,
            Timer {
                armed_at: now,
                deadline,
            },
        )
    }

    /// Cancel the timer for `key`; false if none was armed
    pub fn cancel(&mut self, key: &K) -> bool {
        self.timers.remove(key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&Timer> {
        self.timers.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.timers.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Remove and return every timer with `deadline <= now`
    ///
    /// Ordered by deadline, then key, so firing order is deterministic.
    pub fn drain_expired(&mut self, now: i64) -> Vec<(K, Timer)> {
        let mut expired: Vec<K> = self
            .timers
            .iter()
            .filter(|(_, timer)| timer.deadline <= now)
            .map(|(key, _)| key.clone())
            .collect();
        expired.sort();

        let mut fired: Vec<(K, Timer)> = expired
            .into_iter()
            .filter_map(|key| self.timers.remove(&key).map(|timer| (key, timer)))
            .collect();
        fired.sort_by_key(|(_, timer)| timer.deadline);
        fired
    }

    /// Earliest deadline across all timers
    pub fn next_deadline(&self) -> Option<i64> {
        self.timers.values().map(|timer| timer.deadline).min()
    }
}

impl<K: Eq + Hash + Ord + Clone> Default for TimerRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait timers, confirmation timers, and the sweep schedule
#[derive(Debug, Clone)]
pub struct TimeoutSupervisor {
    wait_timeout_ms: u64,
    confirmation_timeout_ms: u64,
    sweep_interval_ms: u64,
    wait: TimerRegistry<UserId>,
    confirmation: TimerRegistry<SessionId>,
    next_sweep_at: Option<i64>,
}

impl TimeoutSupervisor {
    pub fn from_config(config: &MatchConfig) -> Self {
        Self {
            wait_timeout_ms: config.wait_timeout_ms,
            confirmation_timeout_ms: config.confirmation_timeout_ms,
            sweep_interval_ms: config.sweep_interval_ms,
            wait: TimerRegistry::new(),
            confirmation: TimerRegistry::new(),
            next_sweep_at: None,
        }
    }

    /// Start a total-wait timer for a user entering a bucket
    pub fn arm_wait(&mut self, user_id: &UserId, now: i64) {
        self.wait.schedule(user_id.clone(), now, self.wait_timeout_ms);
    }

    /// Idempotent; false if no wait timer was armed
    pub fn disarm_wait(&mut self, user_id: &UserId) -> bool {
        self.wait.cancel(user_id)
    }

    /// Start the confirmation timer for a pending session
    pub fn arm_confirmation(&mut self, session_id: SessionId, now: i64) {
        self.confirmation
            .schedule(session_id, now, self.confirmation_timeout_ms);
    }

    /// Idempotent; false if no confirmation timer was armed
    pub fn disarm_confirmation(&mut self, session_id: &SessionId) -> bool {
        self.confirmation.cancel(session_id)
    }

    pub fn expired_waits(&mut self, now: i64) -> Vec<(UserId, Timer)> {
        self.wait.drain_expired(now)
    }

    pub fn expired_confirmations(&mut self, now: i64) -> Vec<(SessionId, Timer)> {
        self.confirmation.drain_expired(now)
    }

    pub fn wait_timer(&self, user_id: &UserId) -> Option<&Timer> {
        self.wait.get(user_id)
    }

    pub fn confirmation_timer(&self, session_id: &SessionId) -> Option<&Timer> {
        self.confirmation.get(session_id)
    }

    pub fn confirmation_timeout_ms(&self) -> u64 {
        self.confirmation_timeout_ms
    }

    /// Whether the periodic sweep should run at `now`
    ///
    /// The first call is always due; each due sweep schedules the next one
    /// an interval after `now`.
    pub fn sweep_due(&mut self, now: i64) -> bool {
        let due = self.next_sweep_at.map_or(true, |at| now >= at);
        if due {
            let interval = i64::try_from(self.sweep_interval_ms).unwrap_or(i64::MAX);
            self.next_sweep_at = Some(now.saturating_add(interval));
        }
        due
    }

    /// (armed wait timers, armed confirmation timers)
    pub fn armed_counts(&self) -> (usize, usize) {
        (self.wait.len(), self.confirmation.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_replaces() {
        let mut timers = TimerRegistry::new();
        assert!(timers.schedule("a", 0, 100).is_none());
        let replaced = timers.schedule("a", 50, 100).unwrap();
        assert_eq!(replaced.deadline, 100);
        assert_eq!(timers.get(&"a").unwrap().deadline, 150);
        assert_eq!(timers.len(), 1);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let mut timers = TimerRegistry::new();
        timers.schedule("a", 0, 100);
        assert!(timers.cancel(&"a"));
        assert!(!timers.cancel(&"a"));
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let mut timers = TimerRegistry::new();
        timers.schedule("a", 0, 100);
        assert_eq!(timers.drain_expired(100).len(), 1);
        assert!(!timers.cancel(&"a"));
    }

    #[test]
    fn test_drain_expired_order() {
        let mut timers = TimerRegistry::new();
        timers.schedule("late", 0, 300);
        timers.schedule("b", 0, 100);
        timers.schedule("a", 0, 100);
        timers.schedule("future", 0, 1_000);

        let fired: Vec<&str> = timers.drain_expired(300).into_iter().map(|(k, _)| k).collect();
        assert_eq!(fired, vec!["a", "b", "late"]);
        assert!(timers.contains(&"future"));
        assert_eq!(timers.next_deadline(), Some(1_000));
    }

    #[test]
    fn test_sweep_schedule() {
        let mut supervisor = TimeoutSupervisor::from_config(&MatchConfig::default());
        assert!(supervisor.sweep_due(0));
        assert!(!supervisor.sweep_due(4_999));
        assert!(supervisor.sweep_due(5_000));
        assert!(!supervisor.sweep_due(5_001));
        assert!(supervisor.sweep_due(10_000));
    }

    #[test]
    fn test_wait_timer_lifecycle() {
        let mut supervisor = TimeoutSupervisor::from_config(&MatchConfig::default());
        let u1 = UserId::new("u1");

        supervisor.arm_wait(&u1, 1_000);
        assert_eq!(supervisor.wait_timer(&u1).unwrap().deadline, 121_000);
        assert!(supervisor.expired_waits(120_999).is_empty());

        let fired = supervisor.expired_waits(121_000);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].1.armed_at, 1_000);
        assert!(!supervisor.disarm_wait(&u1));
    }
}
