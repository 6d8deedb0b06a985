//! Vote-based removal
//!
//! Alongside the one-on-one mutual removal path, participants can vote to
//! remove a disruptive peer outright. The tally is measured against the
//! active participants other than the target; passing the configured
//! threshold strictly makes the target a permanent observer.

use crate::config::EngineConfig;
use crate::core::error::DomainError;
use crate::core::ids::UserId;
use crate::participant::Participant;
use crate::round::Round;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One ballot to remove a peer; unique per (round, voter, target)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovalVote {
    pub voter: UserId,
    pub target: UserId,
    pub cast_at: DateTime<Utc>,
}

/// Standing of one removal tally against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RemovalOutcome {
    pub target: UserId,
    pub votes: usize,
    /// Active participants other than the target
    pub electorate: usize,
    pub passed: bool,
}

/// Validate a removal ballot before recording it
pub fn check_vote(
    round: &Round,
    participants: &[Participant],
    voter: UserId,
    target: UserId,
) -> Result<(), DomainError> {
    if voter == target {
        return Err(DomainError::SelfRemoval);
    }
    let record = participants
        .iter()
        .find(|p| p.user == voter)
        .ok_or(DomainError::NotAParticipant(voter))?;
    if !record.is_active() {
        return Err(DomainError::ParticipantNotActive(voter));
    }
    if !round.has_response_from(voter) {
        return Err(DomainError::NotPostedThisRound(voter));
    }
    participants
        .iter()
        .find(|p| p.user == target && p.is_active())
        .ok_or(DomainError::ParticipantNotActive(target))?;
    Ok(())
}

/// Tally the round's removal votes per target
///
/// `passed` requires the vote share to exceed the threshold strictly; an
/// exact 50% with the default threshold is not enough.
pub fn resolve(
    round: &Round,
    participants: &[Participant],
    config: &EngineConfig,
) -> Vec<RemovalOutcome> {
    let mut targets: Vec<UserId> = round.removal_votes.iter().map(|v| v.target).collect();
    targets.sort();
    targets.dedup();

    targets
        .into_iter()
        .map(|target| {
            let votes = round
                .removal_votes
                .iter()
                .filter(|v| v.target == target)
                .count();
            let electorate = participants
                .iter()
                .filter(|p| p.is_active() && p.user != target)
                .count();
            let passed = electorate > 0
                && votes as f64 / electorate as f64 > config.removal_vote_threshold;
            RemovalOutcome {
                target,
                votes,
                electorate,
                passed,
            }
        })
        .collect()
}
