//! Moderation engine: mutual removal and its escalation ladder
//!
//! Mutual removal is deliberately symmetric: invoking it demotes both the
//! initiator and the target to temporary observers, so it costs the
//! initiator their own seat for at least a round. Repeat use escalates to a
//! permanent demotion on the third strike, on either side of the exchange.

use crate::core::error::DomainError;
use crate::core::ids::UserId;
use crate::participant::{ObserverReason, Participant};
use crate::round::{Round, RoundStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mutual removals this many times, initiated or suffered, escalate to a
/// permanent demotion
pub const REMOVAL_ESCALATION_LIMIT: u32 = 3;

/// The kind of moderation consequence an action records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModerationKind {
    MutualRemoval,
    VoteBasedRemoval,
}

/// Audit record of one moderation consequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModerationAction {
    pub kind: ModerationKind,
    /// For vote-based removals the electorate acted, not a single user
    pub initiator: Option<UserId>,
    pub target: UserId,
    pub round: u32,
    pub created_at: DateTime<Utc>,
}

impl ModerationAction {
    /// Whether this action already covers a mutual removal between the two
    /// users, in either direction
    pub fn covers_pair(&self, a: UserId, b: UserId) -> bool {
        self.kind == ModerationKind::MutualRemoval
            && ((self.initiator == Some(a) && self.target == b)
                || (self.initiator == Some(b) && self.target == a))
    }
}

/// What a mutual removal did beyond the two demotions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutualRemovalEffect {
    pub action: ModerationAction,
    /// Initiator hit the escalation limit and became permanent
    pub initiator_escalated: bool,
    /// Target hit the escalation limit and became permanent
    pub target_escalated: bool,
}

fn index_of(participants: &[Participant], user: UserId) -> Result<usize, DomainError> {
    participants
        .iter()
        .position(|p| p.user == user)
        .ok_or(DomainError::NotAParticipant(user))
}

/// Execute a mutual removal, demoting both sides
///
/// Every precondition is checked before anything mutates, so a rejected
/// call leaves the roster untouched.
pub fn initiate_mutual_removal(
    round: &Round,
    participants: &mut [Participant],
    actions: &[ModerationAction],
    initiator: UserId,
    target: UserId,
    now: DateTime<Utc>,
) -> Result<MutualRemovalEffect, DomainError> {
    if initiator == target {
        return Err(DomainError::SelfRemoval);
    }
    if round.status != RoundStatus::InProgress {
        return Err(DomainError::RoundNotInProgress(round.number));
    }
    let initiator_idx = index_of(participants, initiator)?;
    let target_idx = index_of(participants, target)?;
    for idx in [initiator_idx, target_idx] {
        if !participants[idx].is_active() {
            return Err(DomainError::ParticipantNotActive(participants[idx].user));
        }
    }
    for user in [initiator, target] {
        if !round.has_response_from(user) {
            return Err(DomainError::NotPostedThisRound(user));
        }
    }
    if actions.iter().any(|a| a.covers_pair(initiator, target)) {
        return Err(DomainError::DuplicateRemoval);
    }

    {
        let record = &mut participants[initiator_idx];
        record.demote(ObserverReason::MutualRemoval, round.number, true, now);
        record.removals_initiated += 1;
    }
    {
        let record = &mut participants[target_idx];
        record.demote(ObserverReason::MutualRemoval, round.number, true, now);
        record.times_removed += 1;
    }

    let initiator_escalated =
        participants[initiator_idx].removals_initiated >= REMOVAL_ESCALATION_LIMIT;
    if initiator_escalated {
        let record = &mut participants[initiator_idx];
        record.make_permanent(ObserverReason::MutualRemoval, round.number, now);
        // Third initiated removal also forfeits the platform credit
        record.platform_credit = 0.0;
    }
    let target_escalated = participants[target_idx].times_removed >= REMOVAL_ESCALATION_LIMIT;
    if target_escalated {
        participants[target_idx].make_permanent(ObserverReason::MutualRemoval, round.number, now);
    }

    Ok(MutualRemovalEffect {
        action: ModerationAction {
            kind: ModerationKind::MutualRemoval,
            initiator: Some(initiator),
            target,
            round: round.number,
            created_at: now,
        },
        initiator_escalated,
        target_escalated,
    })
}

/// Permanently demote a participant voted out by their peers
pub fn apply_vote_based_removal(
    participants: &mut [Participant],
    target: UserId,
    round_number: u32,
    now: DateTime<Utc>,
) -> Result<ModerationAction, DomainError> {
    let idx = index_of(participants, target)?;
    participants[idx].make_permanent(ObserverReason::VoteBasedRemoval, round_number, now);
    Ok(ModerationAction {
        kind: ModerationKind::VoteBasedRemoval,
        initiator: None,
        target,
        round: round_number,
        created_at: now,
    })
}
