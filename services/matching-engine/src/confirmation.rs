//! Two-party confirmation handshake
//!
//! A pending confirmation is opened the instant two requests are paired.
//! It leaves the coordinator exactly once: finalized (both accepted),
//! rejected (either declined), timed out, or withdrawn (a side cancelled).
//! A user is referenced by at most one pending confirmation at a time.

use serde::Serialize;
use std::collections::HashMap;
use types::difficulty::Difficulty;
use types::errors::MatchError;
use types::ids::{SessionId, UserId};
use types::request::MatchRequest;
use types::session::MatchQuality;

/// One side of a pending confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct ConfirmingSide {
    /// The request that was removed from the bucket, kept for requeueing
    pub request: MatchRequest,
    pub confirmed: bool,
}

impl ConfirmingSide {
    pub fn new(request: MatchRequest) -> Self {
        Self {
            request,
            confirmed: false,
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.request.user_id
    }
}

/// What the pair was matched on
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchInfo {
    pub common_topics: Vec<String>,
    pub difficulty: Difficulty,
    pub quality: MatchQuality,
    pub skill_difference: u64,
}

/// Handshake state between a tentative match and a session
#[derive(Debug, Clone, PartialEq)]
pub struct PendingConfirmation {
    pub session_id: SessionId,
    pub side_a: ConfirmingSide,
    pub side_b: ConfirmingSide,
    pub match_info: MatchInfo,
    pub created_at: i64, // Unix millis
}

impl PendingConfirmation {
    pub fn new(
        session_id: SessionId,
        side_a: MatchRequest,
        side_b: MatchRequest,
        match_info: MatchInfo,
        created_at: i64,
    ) -> Self {
        Self {
            session_id,
            side_a: ConfirmingSide::new(side_a),
            side_b: ConfirmingSide::new(side_b),
            match_info,
            created_at,
        }
    }

    pub fn participants(&self) -> [UserId; 2] {
        [self.side_a.user_id().clone(), self.side_b.user_id().clone()]
    }

    pub fn side(&self, user_id: &UserId) -> Option<&ConfirmingSide> {
        [&self.side_a, &self.side_b]
            .into_iter()
            .find(|side| side.user_id() == user_id)
    }

    fn side_mut(&mut self, user_id: &UserId) -> Option<&mut ConfirmingSide> {
        if self.side_a.user_id() == user_id {
            Some(&mut self.side_a)
        } else if self.side_b.user_id() == user_id {
            Some(&mut self.side_b)
        } else {
            None
        }
    }

    /// The other side, if `user_id` is a participant
    pub fn partner_of(&self, user_id: &UserId) -> Option<&ConfirmingSide> {
        if self.side_a.user_id() == user_id {
            Some(&self.side_b)
        } else if self.side_b.user_id() == user_id {
            Some(&self.side_a)
        } else {
            None
        }
    }

    pub fn both_confirmed(&self) -> bool {
        self.side_a.confirmed && self.side_b.confirmed
    }

    /// Both requests, earliest-enqueued first
    pub fn into_requests(self) -> [MatchRequest; 2] {
        let (a, b) = (self.side_a.request, self.side_b.request);
        if b.enqueued_at < a.enqueued_at {
            [b, a]
        } else {
            [a, b]
        }
    }
}

/// Result of recording one side's answer
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Declined; the confirmation has been removed
    Rejected(PendingConfirmation),
    /// Accepted, partner has not yet. `newly_confirmed` is false when this
    /// side had already accepted before.
    AwaitingPartner { partner: UserId, newly_confirmed: bool },
    /// Both accepted; the confirmation has been removed
    Finalized(PendingConfirmation),
}

/// Holds every open confirmation, indexed by session and by user
#[derive(Debug, Default)]
pub struct ConfirmationCoordinator {
    pending: HashMap<SessionId, PendingConfirmation>,
    by_user: HashMap<UserId, SessionId>,
}

impl ConfirmationCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a confirmation (state OPEN)
    ///
    /// Fails if either user is already confirming another session.
    pub fn open(&mut self, pending: PendingConfirmation) -> Result<(), MatchError> {
        for user_id in pending.participants() {
            if let Some(session_id) = self.by_user.get(&user_id) {
                return Err(MatchError::AlreadyConfirming {
                    user_id: user_id.to_string(),
                    session_id: session_id.to_string(),
                });
            }
        }

        for user_id in pending.participants() {
            self.by_user.insert(user_id, pending.session_id);
        }
        self.pending.insert(pending.session_id, pending);
        Ok(())
    }

    /// Record `user_id`'s answer for `session_id`
    pub fn respond(
        &mut self,
        session_id: &SessionId,
        user_id: &UserId,
        accepted: bool,
    ) -> Result<Transition, MatchError> {
        let pending = self
            .pending
            .get_mut(session_id)
            .ok_or_else(|| MatchError::SessionNotFound {
                session_id: session_id.to_string(),
            })?;

        let side = pending
            .side_mut(user_id)
            .ok_or_else(|| MatchError::NotParticipant {
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
            })?;

        if !accepted {
            let closed = self.remove(session_id);
            return closed
                .map(Transition::Rejected)
                .ok_or_else(|| MatchError::SessionNotFound {
                    session_id: session_id.to_string(),
                });
        }

        let newly_confirmed = !side.confirmed;
        side.confirmed = true;

        if pending.both_confirmed() {
            let closed = self.remove(session_id);
            return closed
                .map(Transition::Finalized)
                .ok_or_else(|| MatchError::SessionNotFound {
                    session_id: session_id.to_string(),
                });
        }

        let partner = pending
            .partner_of(user_id)
            .map(|side| side.user_id().clone())
            .ok_or_else(|| MatchError::NotParticipant {
                user_id: user_id.to_string(),
                session_id: session_id.to_string(),
            })?;

        Ok(Transition::AwaitingPartner {
            partner,
            newly_confirmed,
        })
    }

    /// Close a confirmation whose timer fired (state TIMED_OUT)
    pub fn expire(&mut self, session_id: &SessionId) -> Option<PendingConfirmation> {
        self.remove(session_id)
    }

    /// Close the confirmation `user_id` is part of, if any
    pub fn withdraw(&mut self, user_id: &UserId) -> Option<PendingConfirmation> {
        let session_id = *self.by_user.get(user_id)?;
        self.remove(&session_id)
    }

    pub fn session_for(&self, user_id: &UserId) -> Option<SessionId> {
        self.by_user.get(user_id).copied()
    }

    pub fn get(&self, session_id: &SessionId) -> Option<&PendingConfirmation> {
        self.pending.get(session_id)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    fn remove(&mut self, session_id: &SessionId) -> Option<PendingConfirmation> {
        let pending = self.pending.remove(session_id)?;
        for user_id in pending.participants() {
            self.by_user.remove(&user_id);
        }
        Some(pending)
    }
}

/// Pairs kept apart after a failed confirmation
#[derive(Debug, Default)]
pub struct RematchCooldown {
    until: HashMap<(UserId, UserId), i64>,
}

impl RematchCooldown {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(a: &UserId, b: &UserId) -> (UserId, UserId) {
        if a <= b {
            (a.clone(), b.clone())
        } else {
            (b.clone(), a.clone())
        }
    }

    /// Keep `a` and `b` apart until `until` (Unix millis)
    pub fn record(&mut self, a: &UserId, b: &UserId, until: i64) {
        self.until.insert(Self::key(a, b), until);
    }

    pub fn blocks(&self, a: &UserId, b: &UserId, now: i64) -> bool {
        self.until
            .get(&Self::key(a, b))
            .is_some_and(|until| now < *until)
    }

    /// Drop expired entries
    pub fn prune(&mut self, now: i64) {
        self.until.retain(|_, until| now < *until);
    }

    pub fn len(&self) -> usize {
        self.until.len()
    }

    pub fn is_empty(&self) -> bool {
        self.until.is_empty()
    }
}
