//! Matching logic module
//!
//! Implements time-decayed, topic-filtered closest-skill matching

pub mod decay;
pub mod quality;
pub mod selector;

pub use decay::{SkillThreshold, ThresholdDecay};
pub use quality::QualityPolicy;
pub use selector::{find_best_match, MatchProposal, MatchSearch, Matcher};
