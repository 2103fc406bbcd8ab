//! Matching engine configuration
//!
//! All durations are in milliseconds. Quality ratios are fractions of
//! `initial_threshold`, so tests asserting on quality boundaries move with it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Tunables for matching, relaxation, and timeouts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Skill-difference threshold for a request that has just arrived
    pub initial_threshold: u64,
    /// Threshold reached at the end of the relaxation window
    pub max_threshold: u64,
    /// Wait time after which the threshold becomes unbounded
    pub relaxation_window_ms: u64,
    /// `excellent` if skill difference <= excellent_ratio × initial_threshold
    pub excellent_ratio: f64,
    /// `good` if skill difference <= good_ratio × initial_threshold
    pub good_ratio: f64,
    /// Total wait before a queued request is evicted with MATCH_TIMEOUT
    pub wait_timeout_ms: u64,
    /// Time both sides have to confirm a tentative match
    pub confirmation_timeout_ms: u64,
    /// Interval of the relaxed re-matching sweep
    pub sweep_interval_ms: u64,
    /// How long a pair whose confirmation failed is kept apart
    pub rematch_cooldown_ms: u64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            initial_threshold: 10,
            max_threshold: 300,
            relaxation_window_ms: 60_000,
            excellent_ratio: 0.3,
            good_ratio: 0.7,
            wait_timeout_ms: 120_000,
            confirmation_timeout_ms: 30_000,
            sweep_interval_ms: 5_000,
            rematch_cooldown_ms: 60_000,
        }
    }
}

/// Configuration rejected by [`MatchConfig::validate`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("max_threshold ({max}) must be >= initial_threshold ({initial})")]
    ThresholdOrder { initial: u64, max: u64 },

    #[error("{field} must be greater than zero")]
    ZeroDuration { field: &'static str },

    #[error("quality ratios must satisfy 0 <= excellent ({excellent}) <= good ({good})")]
    QualityRatios { excellent: f64, good: f64 },
}

impl MatchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_threshold < self.initial_threshold {
            return Err(ConfigError::ThresholdOrder {
                initial: self.initial_threshold,
                max: self.max_threshold,
            });
        }

        let durations = [
            ("relaxation_window_ms", self.relaxation_window_ms),
            ("wait_timeout_ms", self.wait_timeout_ms),
            ("confirmation_timeout_ms", self.confirmation_timeout_ms),
            ("sweep_interval_ms", self.sweep_interval_ms),
        ];
        if let Some(&(field, _)) = durations.iter().find(|(_, v)| *v == 0) {
            return Err(ConfigError::ZeroDuration { field });
        }

        let ratios_ok = self.excellent_ratio.is_finite()
            && self.good_ratio.is_finite()
            && self.excellent_ratio >= 0.0
            && self.excellent_ratio <= self.good_ratio;
        if !ratios_ok {
            return Err(ConfigError::QualityRatios {
                excellent: self.excellent_ratio,
                good: self.good_ratio,
            });
        }

        Ok(())
    }
}
