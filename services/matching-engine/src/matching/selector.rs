//! Best-partner selection
//!
//! Scans candidates in queue order. A candidate is eligible when it is a
//! different user, shares at least one topic, and its skill difference is
//! within the threshold. The eligible candidate with the smallest skill
//! difference wins; ties go to the first one encountered.

use serde::Serialize;
use types::ids::UserId;
use types::request::MatchRequest;
use types::session::MatchQuality;

use super::decay::{SkillThreshold, ThresholdDecay};
use super::quality::QualityPolicy;
use crate::config::MatchConfig;
use crate::scoring::{common_topics, has_common_topic, skill};

/// The partner chosen for a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchProposal {
    pub partner_id: UserId,
    pub skill_difference: u64,
    pub common_topics: Vec<String>,
    pub quality: MatchQuality,
}

/// Result of one search
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchSearch {
    pub threshold_used: SkillThreshold,
    pub proposal: Option<MatchProposal>,
}

impl MatchSearch {
    pub fn found(&self) -> bool {
        self.proposal.is_some()
    }
}

/// Find the best partner for `request` among `candidates`
///
/// `candidates` may include `request` itself; it is skipped.
pub fn find_best_match<'a, I>(
    request: &MatchRequest,
    candidates: I,
    threshold: SkillThreshold,
    quality: &QualityPolicy,
) -> MatchSearch
where
    I: IntoIterator<Item = &'a MatchRequest>,
{
    let mut best: Option<(u64, &MatchRequest)> = None;

    for candidate in candidates {
        if candidate.user_id == request.user_id {
            continue;
        }
        // Hard filter, never relaxed
        if !has_common_topic(&request.topics, &candidate.topics) {
            continue;
        }
        let diff = skill::difference(request.skill_score, candidate.skill_score);
        if !threshold.admits(diff) {
            continue;
        }
        if best.map_or(true, |(best_diff, _)| diff < best_diff) {
            best = Some((diff, candidate));
        }
    }

    let proposal = best.map(|(diff, partner)| MatchProposal {
        partner_id: partner.user_id.clone(),
        skill_difference: diff,
        common_topics: common_topics(&request.topics, &partner.topics),
        quality: quality.classify(diff),
    });

    MatchSearch {
        threshold_used: threshold,
        proposal,
    }
}

/// Decay and quality policy bundled from one config
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matcher {
    decay: ThresholdDecay,
    quality: QualityPolicy,
}

impl Matcher {
    pub fn from_config(config: &MatchConfig) -> Self {
        Self {
            decay: ThresholdDecay::from_config(config),
            quality: QualityPolicy::from_config(config),
        }
    }

    pub fn threshold(&self, time_in_queue_ms: u64) -> SkillThreshold {
        self.decay.threshold(time_in_queue_ms)
    }

    /// Search with the threshold for the requester's time in queue
    pub fn search<'a, I>(&self, request: &MatchRequest, candidates: I, time_in_queue_ms: u64) -> MatchSearch
    where
        I: IntoIterator<Item = &'a MatchRequest>,
    {
        find_best_match(request, candidates, self.threshold(time_in_queue_ms), &self.quality)
    }
}
