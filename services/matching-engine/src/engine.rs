//! Matching engine core
//!
//! Owns the buckets, the confirmation coordinator, the timers and the
//! session registry, and drives every transition between them. All calls
//! take `&mut self`, so one engine instance serializes its own state; the
//! caller decides how to share it. Time is always passed in explicitly as
//! Unix milliseconds.

use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};
use types::difficulty::Difficulty;
use types::errors::MatchError;
use types::ids::{SessionId, UserId};
use types::request::{MatchRequest, MatchSubmission};
use types::session::{MatchQuality, Session};

use crate::config::{ConfigError, MatchConfig};
use crate::confirmation::{
    ConfirmationCoordinator, MatchInfo, PendingConfirmation, RematchCooldown, Transition,
};
use crate::events::{MatchEvent, SessionHandoff};
use crate::intake;
use crate::matching::{MatchProposal, MatchSearch, Matcher};
use crate::notifier::Notifier;
use crate::queue::QueueBook;
use crate::session::SessionFactory;
use crate::supervisor::TimeoutSupervisor;

const PARTNER_DECLINED: &str = "Your partner declined the match";
const SELF_DECLINED: &str = "You declined the match";
const PARTNER_CANCELLED: &str = "Your partner cancelled the match";

/// Result of submitting a match request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SubmitOutcome {
    /// No partner yet; waiting in the bucket at `position` (zero-based)
    #[serde(rename_all = "camelCase")]
    Queued { difficulty: Difficulty, position: usize },
    /// Paired immediately; a confirmation is now pending
    #[serde(rename_all = "camelCase")]
    Matched {
        session_id: SessionId,
        partner_id: UserId,
        quality: MatchQuality,
        skill_difference: u64,
    },
}

/// Where a confirmation stands after one side answered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmStatus {
    Rejected,
    WaitingForPartner,
    BothConfirmed,
}

/// Result of `confirm`
///
/// `handoff` is set only on `BothConfirmed`; the caller forwards it to the
/// collaboration system.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmOutcome {
    pub status: ConfirmStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handoff: Option<SessionHandoff>,
}

/// What one `tick` did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickReport {
    pub confirmation_timeouts: usize,
    pub wait_timeouts: usize,
    pub swept: bool,
    pub sweep_matches: usize,
}

/// Point-in-time counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineStats {
    pub waiting_easy: usize,
    pub waiting_medium: usize,
    pub waiting_hard: usize,
    pub pending_confirmations: usize,
    pub sessions: usize,
    pub wait_timers: usize,
    pub confirmation_timers: usize,
}

/// Main matching engine
pub struct MatchingEngine {
    config: MatchConfig,
    matcher: Matcher,
    /// Waiting requests, one bucket per difficulty
    queues: QueueBook,
    confirmations: ConfirmationCoordinator,
    supervisor: TimeoutSupervisor,
    sessions: SessionFactory,
    cooldown: RematchCooldown,
    notifier: Arc<dyn Notifier>,
}

impl MatchingEngine {
    /// Engine with the default configuration
    pub fn new(notifier: Arc<dyn Notifier>) -> Self {
        Self::build(MatchConfig::default(), notifier)
    }

    /// Engine with a validated custom configuration
    pub fn with_config(config: MatchConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, notifier))
    }

    fn build(config: MatchConfig, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            matcher: Matcher::from_config(&config),
            queues: QueueBook::new(),
            confirmations: ConfirmationCoordinator::new(),
            supervisor: TimeoutSupervisor::from_config(&config),
            sessions: SessionFactory::new(),
            cooldown: RematchCooldown::new(),
            notifier,
            config,
        }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Submit a match request
    ///
    /// The request is validated, then searched against its bucket with the
    /// initial threshold. If a partner is found both leave the queue and a
    /// confirmation opens; otherwise the request waits and its wait timer
    /// starts.
    pub fn submit(&mut self, submission: MatchSubmission, now: i64) -> Result<SubmitOutcome, MatchError> {
        let request = intake::admit(submission, now)?;
        self.ensure_idle(&request.user_id)?;

        let difficulty = request.difficulty;
        let search = self.search(&request, 0, now);
        debug!(
            user_id = %request.user_id,
            %difficulty,
            threshold = ?search.threshold_used,
            found = search.found(),
            "Immediate match search"
        );

        if let Some(proposal) = search.proposal {
            // Remove first, then check: the partner may have left already
            if let Some(partner) = self
                .queues
                .bucket_mut(difficulty)
                .remove_by_user_id(&proposal.partner_id)
            {
                let partner_id = partner.user_id.clone();
                let (quality, skill_difference) = (proposal.quality, proposal.skill_difference);
                let session_id = self.open_confirmation(partner, request, proposal, now)?;
                return Ok(SubmitOutcome::Matched {
                    session_id,
                    partner_id,
                    quality,
                    skill_difference,
                });
            }
        }

        let user_id = request.user_id.clone();
        let bucket = self.queues.bucket_mut(difficulty);
        bucket.enqueue(request);
        let position = bucket.len() - 1;
        self.supervisor.arm_wait(&user_id, now);

        info!(%user_id, %difficulty, position, "Request queued");
        Ok(SubmitOutcome::Queued {
            difficulty,
            position,
        })
    }

    /// Cancel whatever `user_id` is doing
    ///
    /// A waiting request leaves its bucket. A pending confirmation is
    /// withdrawn; the partner is told and requeued with priority. Returns
    /// false when the user had nothing to cancel.
    pub fn cancel(&mut self, user_id: &UserId, now: i64) -> bool {
        if let Some(request) = self.queues.remove_anywhere(user_id) {
            self.supervisor.disarm_wait(user_id);
            self.notify(user_id, MatchEvent::Cancelled);
            info!(%user_id, difficulty = %request.difficulty, "Queued request cancelled");
            return true;
        }

        if let Some(pending) = self.confirmations.withdraw(user_id) {
            let session_id = pending.session_id;
            self.supervisor.disarm_confirmation(&session_id);
            let [a, b] = pending.participants();
            self.hold_apart(&a, &b, now);

            self.notify(user_id, MatchEvent::Cancelled);
            if let Some(partner) = pending.partner_of(user_id) {
                self.notify(
                    partner.user_id(),
                    MatchEvent::MatchRejected {
                        session_id,
                        message: PARTNER_CANCELLED.to_string(),
                    },
                );
            }
            info!(%user_id, %session_id, "Pending confirmation withdrawn");

            // Only the partner goes back; the canceller is out
            for request in pending.into_requests() {
                if &request.user_id != user_id {
                    self.requeue_front(request, now);
                }
            }
            return true;
        }

        // A wait timer that outlived its request is harmless, drop it
        self.supervisor.disarm_wait(user_id);
        false
    }

    /// Record `user_id`'s answer for `session_id`
    ///
    /// Repeated accepts are idempotent. Answering a session that is no
    /// longer pending is `SessionNotFound`.
    pub fn confirm(
        &mut self,
        user_id: &UserId,
        session_id: SessionId,
        accepted: bool,
        now: i64,
    ) -> Result<ConfirmOutcome, MatchError> {
        match self.confirmations.respond(&session_id, user_id, accepted)? {
            Transition::Rejected(pending) => {
                self.supervisor.disarm_confirmation(&session_id);
                let [a, b] = pending.participants();
                self.hold_apart(&a, &b, now);

                for participant in [&a, &b] {
                    let message = if participant == user_id {
                        SELF_DECLINED
                    } else {
                        PARTNER_DECLINED
                    };
                    self.notify(
                        participant,
                        MatchEvent::MatchRejected {
                            session_id,
                            message: message.to_string(),
                        },
                    );
                }
                info!(%user_id, %session_id, "Match rejected, both sides requeued");

                self.requeue_pair(pending, now);
                Ok(ConfirmOutcome {
                    status: ConfirmStatus::Rejected,
                    handoff: None,
                })
            }
            Transition::AwaitingPartner {
                partner,
                newly_confirmed,
            } => {
                if newly_confirmed {
                    self.notify(&partner, MatchEvent::PartnerConfirmed { session_id });
                    debug!(%user_id, %session_id, "Waiting for partner confirmation");
                }
                Ok(ConfirmOutcome {
                    status: ConfirmStatus::WaitingForPartner,
                    handoff: None,
                })
            }
            Transition::Finalized(pending) => {
                self.supervisor.disarm_confirmation(&session_id);
                let session = self.finalize(pending, now)?;

                for (participant, partner) in [
                    (&session.participant_user_ids[0], &session.participant_user_ids[1]),
                    (&session.participant_user_ids[1], &session.participant_user_ids[0]),
                ] {
                    self.notify(
                        participant,
                        MatchEvent::MatchConfirmed {
                            session_id,
                            partner_id: partner.clone(),
                            matched_topics: session.matched_topics.clone(),
                            difficulty: session.difficulty,
                            match_quality: session.match_quality,
                        },
                    );
                }
                info!(
                    %session_id,
                    difficulty = %session.difficulty,
                    quality = session.match_quality.as_str(),
                    "Session created"
                );

                Ok(ConfirmOutcome {
                    status: ConfirmStatus::BothConfirmed,
                    handoff: Some(SessionHandoff::from(&session)),
                })
            }
        }
    }

    /// A finalized session
    pub fn session(&self, session_id: &SessionId) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    /// Fire due timers, then run the relaxed sweep if it is due
    ///
    /// Confirmation timeouts go first so the requests they requeue are
    /// visible to the same tick's sweep. An expired confirmation is handled
    /// as of its deadline: the requeued wait timers and the rematch cooldown
    /// start there, not at `now`.
    pub fn tick(&mut self, now: i64) -> TickReport {
        let mut report = TickReport::default();

        for (session_id, timer) in self.supervisor.expired_confirmations(now) {
            let Some(pending) = self.confirmations.expire(&session_id) else {
                continue;
            };
            let expired_at = timer.deadline;
            let [a, b] = pending.participants();
            self.hold_apart(&a, &b, expired_at);
            for participant in [&a, &b] {
                self.notify(participant, MatchEvent::ConfirmationTimeout { session_id });
            }
            info!(%session_id, expired_at, "Confirmation timed out, both sides requeued");

            self.requeue_pair(pending, expired_at);
            report.confirmation_timeouts += 1;
        }

        for (user_id, timer) in self.supervisor.expired_waits(now) {
            let Some(request) = self.queues.remove_anywhere(&user_id) else {
                continue;
            };
            let time_waited = u64::try_from(now.saturating_sub(timer.armed_at)).unwrap_or(0);
            self.notify(&user_id, MatchEvent::MatchTimeout { time_waited });
            info!(%user_id, difficulty = %request.difficulty, time_waited, "Request timed out");
            report.wait_timeouts += 1;
        }

        if self.supervisor.sweep_due(now) {
            report.swept = true;
            report.sweep_matches = self.sweep(now);
            self.cooldown.prune(now);
        }

        report
    }

    /// Re-search every waiting request with its relaxed threshold
    ///
    /// Buckets are visited in difficulty order and entries in queue order.
    /// Returns the number of confirmations opened.
    pub fn sweep(&mut self, now: i64) -> usize {
        let mut opened = 0;

        for difficulty in Difficulty::ALL {
            for user_id in self.queues.bucket(difficulty).user_ids() {
                // Already paired earlier in this sweep
                let Some(request) = self.queues.bucket(difficulty).get(&user_id).cloned() else {
                    continue;
                };
                let waited = u64::try_from(now.saturating_sub(request.enqueued_at)).unwrap_or(0);
                let Some(proposal) = self.search(&request, waited, now).proposal else {
                    continue;
                };

                let Some((partner, requester)) = self
                    .queues
                    .bucket_mut(difficulty)
                    .remove_pair(&proposal.partner_id, &user_id)
                else {
                    continue;
                };

                match self.open_confirmation(partner, requester, proposal, now) {
                    Ok(session_id) => {
                        debug!(%user_id, %session_id, waited, "Sweep paired request");
                        opened += 1;
                    }
                    Err(err) => warn!(%user_id, error = %err, "Sweep could not open confirmation"),
                }
            }
        }

        if opened > 0 {
            info!(opened, "Sweep opened confirmations");
        }
        opened
    }

    /// Requests waiting in one bucket, in scan order
    pub fn snapshot(&self, difficulty: Difficulty) -> Vec<MatchRequest> {
        self.queues.bucket(difficulty).snapshot()
    }

    pub fn queue_len(&self, difficulty: Difficulty) -> usize {
        self.queues.bucket(difficulty).len()
    }

    pub fn is_waiting(&self, user_id: &UserId) -> bool {
        self.queues.contains(user_id)
    }

    /// The pending confirmation `user_id` is part of
    pub fn pending_session_for(&self, user_id: &UserId) -> Option<SessionId> {
        self.confirmations.session_for(user_id)
    }

    pub fn pending(&self, session_id: &SessionId) -> Option<&PendingConfirmation> {
        self.confirmations.get(session_id)
    }

    pub fn has_wait_timer(&self, user_id: &UserId) -> bool {
        self.supervisor.wait_timer(user_id).is_some()
    }

    pub fn has_confirmation_timer(&self, session_id: &SessionId) -> bool {
        self.supervisor.confirmation_timer(session_id).is_some()
    }

    pub fn stats(&self) -> EngineStats {
        let (wait_timers, confirmation_timers) = self.supervisor.armed_counts();
        EngineStats {
            waiting_easy: self.queue_len(Difficulty::Easy),
            waiting_medium: self.queue_len(Difficulty::Medium),
            waiting_hard: self.queue_len(Difficulty::Hard),
            pending_confirmations: self.confirmations.len(),
            sessions: self.sessions.len(),
            wait_timers,
            confirmation_timers,
        }
    }

    fn ensure_idle(&self, user_id: &UserId) -> Result<(), MatchError> {
        if self.queues.contains(user_id) {
            return Err(MatchError::AlreadyQueued {
                user_id: user_id.to_string(),
            });
        }
        if let Some(session_id) = self.confirmations.session_for(user_id) {
            return Err(MatchError::AlreadyConfirming {
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
            });
        }
        Ok(())
    }

    /// Search `request`'s bucket, skipping pairs still in cooldown
    fn search(&self, request: &MatchRequest, time_in_queue_ms: u64, now: i64) -> MatchSearch {
        let cooldown = &self.cooldown;
        let candidates = self
            .queues
            .bucket(request.difficulty)
            .iter()
            .filter(|candidate| !cooldown.blocks(&request.user_id, &candidate.user_id, now));
        self.matcher.search(request, candidates, time_in_queue_ms)
    }

    /// Move a freshly removed pair into a pending confirmation
    ///
    /// `proposal` was computed for `requester`, so its topics come from
    /// the requester's side.
    fn open_confirmation(
        &mut self,
        partner: MatchRequest,
        requester: MatchRequest,
        proposal: MatchProposal,
        now: i64,
    ) -> Result<SessionId, MatchError> {
        self.supervisor.disarm_wait(&partner.user_id);
        self.supervisor.disarm_wait(&requester.user_id);

        let session_id = self.sessions.issue_id();
        let info = MatchInfo {
            common_topics: proposal.common_topics,
            difficulty: requester.difficulty,
            quality: proposal.quality,
            skill_difference: proposal.skill_difference,
        };
        let time_to_confirm = self.supervisor.confirmation_timeout_ms();
        let found_for = |other: &MatchRequest| MatchEvent::MatchFound {
            session_id,
            partner_id: other.user_id.clone(),
            partner_username: other.username.clone(),
            matched_topics: info.common_topics.clone(),
            difficulty: info.difficulty,
            match_quality: info.quality,
            skill_difference: info.skill_difference,
            time_to_confirm,
        };
        let events = [
            (partner.user_id.clone(), found_for(&requester)),
            (requester.user_id.clone(), found_for(&partner)),
        ];

        self.confirmations
            .open(PendingConfirmation::new(session_id, partner, requester, info, now))?;
        self.supervisor.arm_confirmation(session_id, now);

        for (recipient, event) in events {
            self.notify(&recipient, event);
        }
        info!(%session_id, "Match found, awaiting confirmation");
        Ok(session_id)
    }

    fn finalize(&mut self, pending: PendingConfirmation, now: i64) -> Result<Session, MatchError> {
        let info = pending.match_info;
        let participants = [
            pending.side_a.request.user_id,
            pending.side_b.request.user_id,
        ];
        let session = self.sessions.create_session(
            pending.session_id,
            participants,
            info.common_topics,
            info.difficulty,
            info.quality,
            now,
        )?;
        Ok(session.clone())
    }

    /// Put both sides of a failed confirmation back at the front
    ///
    /// The earliest-enqueued side ends up first.
    fn requeue_pair(&mut self, pending: PendingConfirmation, now: i64) {
        let [first, second] = pending.into_requests();
        self.requeue_front(second, now);
        self.requeue_front(first, now);
    }

    fn requeue_front(&mut self, request: MatchRequest, now: i64) {
        let user_id = request.user_id.clone();
        if self.queues.bucket_mut(request.difficulty).enqueue_front(request) {
            self.supervisor.arm_wait(&user_id, now);
        }
    }

    fn hold_apart(&mut self, a: &UserId, b: &UserId, now: i64) {
        let cooldown = i64::try_from(self.config.rematch_cooldown_ms).unwrap_or(i64::MAX);
        let until = now.saturating_add(cooldown);
        self.cooldown.record(a, b, until);
    }

    fn notify(&self, user_id: &UserId, event: MatchEvent) {
        if !self.notifier.try_deliver(user_id, &event) {
            debug!(%user_id, event = event.kind(), "User unreachable, event dropped");
        }
    }
}
