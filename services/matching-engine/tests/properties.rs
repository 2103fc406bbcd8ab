//! Property tests for matching invariants

use matching_engine::matching::{find_best_match, QualityPolicy, SkillThreshold, ThresholdDecay};
use matching_engine::scoring::has_common_topic;
use matching_engine::{MatchConfig, MatchingEngine, MemoryNotifier};
use proptest::prelude::*;
use std::sync::Arc;
use types::difficulty::Difficulty;
use types::ids::UserId;
use types::request::{MatchRequest, MatchSubmission, QuestionStats};

const TOPICS: [&str; 3] = ["arrays", "graphs", "dp"];
const USERS: usize = 6;

#[derive(Debug, Clone)]
enum Op {
    Submit {
        user: usize,
        topics: Vec<usize>,
        difficulty: usize,
        solved: u32,
    },
    Cancel {
        user: usize,
    },
    Answer {
        user: usize,
        accept: bool,
    },
    Advance {
        ms: i64,
    },
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0..USERS, prop::collection::vec(0..TOPICS.len(), 1..3), 0..3usize, 0..40u32)
            .prop_map(|(user, topics, difficulty, solved)| Op::Submit { user, topics, difficulty, solved }),
        1 => (0..USERS).prop_map(|user| Op::Cancel { user }),
        2 => (0..USERS, any::<bool>()).prop_map(|(user, accept)| Op::Answer { user, accept }),
        2 => (1..40_000i64).prop_map(|ms| Op::Advance { ms }),
    ]
}

fn user(index: usize) -> UserId {
    UserId::new(format!("u{index}"))
}

fn request(id: &str, topics: &[&str], score: u64) -> MatchRequest {
    MatchRequest {
        user_id: UserId::new(id),
        username: None,
        topics: topics.iter().map(|t| t.to_string()).collect(),
        difficulty: Difficulty::Easy,
        question_stats: QuestionStats::default(),
        skill_score: score,
        enqueued_at: 0,
    }
}

/// Occupancy, timer and pairing invariants that must hold between calls
fn check_invariants(engine: &MatchingEngine) {
    for index in 0..USERS {
        let id = user(index);
        let waiting = engine.is_waiting(&id);
        let confirming = engine.pending_session_for(&id);

        assert!(!(waiting && confirming.is_some()), "{id} is both waiting and confirming");
        assert_eq!(waiting, engine.has_wait_timer(&id), "{id} wait timer out of sync");

        let in_buckets = Difficulty::ALL
            .iter()
            .filter(|d| engine.snapshot(**d).iter().any(|r| r.user_id == id))
            .count();
        assert!(in_buckets <= 1, "{id} sits in {in_buckets} buckets");

        if let Some(session_id) = confirming {
            assert!(engine.has_confirmation_timer(&session_id));
            let pending = engine.pending(&session_id).expect("indexed session is pending");
            let (a, b) = (&pending.side_a.request, &pending.side_b.request);
            assert_ne!(a.user_id, b.user_id);
            assert_eq!(a.difficulty, b.difficulty);
            assert!(has_common_topic(&a.topics, &b.topics));
            assert!(!pending.match_info.common_topics.is_empty());
        }
    }
}

proptest! {
    #[test]
    fn engine_invariants_hold_under_random_operations(ops in prop::collection::vec(op(), 1..60)) {
        let mut engine = MatchingEngine::new(Arc::new(MemoryNotifier::new()));
        let mut now = 0i64;

        for op in ops {
            match op {
                Op::Submit { user: index, topics, difficulty, solved } => {
                    let topics: Vec<&str> = topics.into_iter().map(|t| TOPICS[t]).collect();
                    let submission = MatchSubmission::new(
                        format!("u{index}"),
                        &topics,
                        Difficulty::ALL[difficulty].as_str(),
                        QuestionStats::new(solved, 0, 0),
                    );
                    // Duplicates are rejected, never double-queued
                    let _ = engine.submit(submission, now);
                }
                Op::Cancel { user: index } => {
                    engine.cancel(&user(index), now);
                }
                Op::Answer { user: index, accept } => {
                    if let Some(session_id) = engine.pending_session_for(&user(index)) {
                        prop_assert!(engine.confirm(&user(index), session_id, accept, now).is_ok());
                    }
                }
                Op::Advance { ms } => {
                    now += ms;
                    engine.tick(now);
                }
            }
            check_invariants(&engine);
        }
    }

    #[test]
    fn threshold_never_shrinks_with_wait(t1 in 0u64..200_000, t2 in 0u64..200_000) {
        let decay = ThresholdDecay::from_config(&MatchConfig::default());
        let (early, late) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };
        prop_assert!(decay.threshold(early) <= decay.threshold(late));
        prop_assert!(decay.threshold(0) == SkillThreshold::Bounded(10));
    }

    #[test]
    fn selected_partner_always_shares_a_topic(
        mine in prop::collection::vec(0..TOPICS.len(), 1..3),
        others in prop::collection::vec((prop::collection::vec(0..TOPICS.len(), 1..3), 0..100u64), 0..8),
        score in 0..100u64,
    ) {
        let mine: Vec<&str> = mine.into_iter().map(|t| TOPICS[t]).collect();
        let me = request("me", &mine, score);
        let candidates: Vec<MatchRequest> = others
            .into_iter()
            .enumerate()
            .map(|(i, (topics, s))| {
                let topics: Vec<&str> = topics.into_iter().map(|t| TOPICS[t]).collect();
                request(&format!("c{i}"), &topics, s)
            })
            .collect();

        let policy = QualityPolicy::from_config(&MatchConfig::default());
        let search = find_best_match(&me, &candidates, SkillThreshold::Unbounded, &policy);
        if let Some(proposal) = search.proposal {
            let partner = candidates
                .iter()
                .find(|c| c.user_id == proposal.partner_id)
                .expect("partner comes from the candidates");
            prop_assert!(has_common_topic(&me.topics, &partner.topics));
            prop_assert!(!proposal.common_topics.is_empty());
            let best = candidates
                .iter()
                .filter(|c| has_common_topic(&me.topics, &c.topics))
                .map(|c| c.skill_score.abs_diff(score))
                .min();
            prop_assert_eq!(Some(proposal.skill_difference), best);
        } else {
            prop_assert!(candidates.iter().all(|c| !has_common_topic(&me.topics, &c.topics)));
        }
    }
}
