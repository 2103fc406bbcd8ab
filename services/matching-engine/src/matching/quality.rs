//! Match quality classification

use types::session::MatchQuality;

use crate::config::MatchConfig;

/// Skill-difference boundaries for the quality tags
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QualityPolicy {
    excellent_max: f64,
    good_max: f64,
}

impl QualityPolicy {
    /// Boundaries are `ratio × initial_threshold`
    pub fn from_config(config: &MatchConfig) -> Self {
        let initial = config.initial_threshold as f64;
        Self {
            excellent_max: config.excellent_ratio * initial,
            good_max: config.good_ratio * initial,
        }
    }

    pub fn classify(&self, skill_difference: u64) -> MatchQuality {
        let diff = skill_difference as f64;
        if diff <= self.excellent_max {
            MatchQuality::Excellent
        } else if diff <= self.good_max {
            MatchQuality::Good
        } else {
            MatchQuality::Acceptable
        }
    }
}
