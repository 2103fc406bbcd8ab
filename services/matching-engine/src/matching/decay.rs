//! Time-decayed skill threshold
//!
//! A freshly queued request only matches partners of very close skill. The
//! acceptable difference widens linearly with time in queue and becomes
//! unbounded once the relaxation window has elapsed. Topic overlap is not
//! affected by decay.

use serde::{Serialize, Serializer};

use crate::config::MatchConfig;

/// Maximum acceptable skill difference
///
/// Ordering: every `Bounded` value is below `Unbounded`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SkillThreshold {
    Bounded(u64),
    Unbounded,
}

impl SkillThreshold {
    /// Whether a pair with `skill_difference` is acceptable
    pub fn admits(&self, skill_difference: u64) -> bool {
        match self {
            SkillThreshold::Bounded(limit) => skill_difference <= *limit,
            SkillThreshold::Unbounded => true,
        }
    }

    /// The numeric limit, None when unbounded
    pub fn limit(&self) -> Option<u64> {
        match self {
            SkillThreshold::Bounded(limit) => Some(*limit),
            SkillThreshold::Unbounded => None,
        }
    }
}

/// Serialized as a number, or `null` when unbounded
impl Serialize for SkillThreshold {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.limit().serialize(serializer)
    }
}

/// Linear interpolation from `initial` to `max` over `window_ms`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdDecay {
    initial: u64,
    max: u64,
    window_ms: u64,
}

impl ThresholdDecay {
    pub fn new(initial: u64, max: u64, window_ms: u64) -> Self {
        Self {
            initial,
            max: max.max(initial),
            window_ms,
        }
    }

    pub fn from_config(config: &MatchConfig) -> Self {
        Self::new(
            config.initial_threshold,
            config.max_threshold,
            config.relaxation_window_ms,
        )
    }

    /// Threshold for a request that has waited `time_in_queue_ms`
    ///
    /// Rounded to the nearest integer inside the window; unbounded at or
    /// after the end of it.
    pub fn threshold(&self, time_in_queue_ms: u64) -> SkillThreshold {
        if time_in_queue_ms >= self.window_ms {
            return SkillThreshold::Unbounded;
        }
        let progress = time_in_queue_ms as f64 / self.window_ms as f64;
        let span = (self.max - self.initial) as f64;
        let value = self.initial as f64 + span * progress;
        SkillThreshold::Bounded(value.round() as u64)
    }
}
