//! Parameter voting resolver
//!
//! Each round's voting window lets eligible participants nudge the
//! discussion's response length cap (MRL) and time multiplier (RTM) up or
//! down. Abstentions are implicit `no_change` ballots, so a parameter only
//! moves when a strict majority of the full electorate explicitly asks for
//! the same direction.

use crate::config::EngineConfig;
use crate::core::ids::UserId;
use crate::discussion::ResponseParams;
use crate::participant::Participant;
use crate::round::Round;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A voter's stance on one parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum VoteChoice {
    Increase,
    #[default]
    NoChange,
    Decrease,
}

/// One (MRL, RTM) ballot; unique per (round, voter)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterVote {
    pub voter: UserId,
    pub mrl: VoteChoice,
    pub rtm: VoteChoice,
    pub cast_at: DateTime<Utc>,
}

impl ParameterVote {
    pub fn new(voter: UserId, mrl: VoteChoice, rtm: VoteChoice, cast_at: DateTime<Utc>) -> Self {
        Self {
            voter,
            mrl,
            rtm,
            cast_at,
        }
    }
}

/// Explicit counts plus the abstentions folded into `no_change`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoteTally {
    pub increase: usize,
    pub no_change: usize,
    pub decrease: usize,
    pub eligible: usize,
}

impl VoteTally {
    /// The choice holding a strict majority of the electorate, else
    /// `no_change`
    pub fn winner(&self) -> VoteChoice {
        let majority = |count: usize| count * 2 > self.eligible;
        if majority(self.increase) {
            VoteChoice::Increase
        } else if majority(self.decrease) {
            VoteChoice::Decrease
        } else {
            VoteChoice::NoChange
        }
    }
}

/// The resolved outcome for one round's parameter vote
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterResolution {
    pub mrl_tally: VoteTally,
    pub rtm_tally: VoteTally,
    pub mrl_result: VoteChoice,
    pub rtm_result: VoteChoice,
    /// Parameter values after applying the winners and clamping
    pub params: ResponseParams,
}

impl ParameterResolution {
    pub fn changed_anything(&self) -> bool {
        self.mrl_result != VoteChoice::NoChange || self.rtm_result != VoteChoice::NoChange
    }
}

/// The electorate for a round: the initiator unconditionally, plus every
/// active participant who posted in that round
pub fn eligible_voters(
    round: &Round,
    participants: &[Participant],
    initiator: UserId,
) -> BTreeSet<UserId> {
    let mut voters: BTreeSet<UserId> = participants
        .iter()
        .filter(|p| p.is_active() && round.has_response_from(p.user))
        .map(|p| p.user)
        .collect();
    voters.insert(initiator);
    voters
}

/// Whether `user` may cast a ballot in this round
pub fn is_eligible(round: &Round, participants: &[Participant], initiator: UserId, user: UserId) -> bool {
    if user == initiator {
        return true;
    }
    participants
        .iter()
        .any(|p| p.user == user && p.is_active() && round.has_response_from(user))
}

fn tally_one(
    votes: impl Iterator<Item = VoteChoice>,
    eligible: usize,
) -> VoteTally {
    let mut tally = VoteTally {
        increase: 0,
        no_change: 0,
        decrease: 0,
        eligible,
    };
    let mut cast = 0usize;
    for choice in votes {
        cast += 1;
        match choice {
            VoteChoice::Increase => tally.increase += 1,
            VoteChoice::NoChange => tally.no_change += 1,
            VoteChoice::Decrease => tally.decrease += 1,
        }
    }
    // Every eligible voter who stayed silent counts as no_change
    tally.no_change += eligible.saturating_sub(cast);
    tally
}

/// Apply a winning direction to one parameter value
fn adjusted(value: f64, result: VoteChoice, increment_pct: u32) -> f64 {
    let factor = increment_pct as f64 / 100.0;
    match result {
        VoteChoice::Increase => value * (1.0 + factor),
        VoteChoice::Decrease => value * (1.0 - factor),
        VoteChoice::NoChange => value,
    }
}

/// Tally both parameters and compute the post-vote parameter values
///
/// Ballots from voters outside the electorate are ignored rather than
/// rejected here; the cast-vote path refuses them up front, but a
/// participant may lose eligibility between casting and resolution.
pub fn resolve(
    round: &Round,
    participants: &[Participant],
    initiator: UserId,
    current: ResponseParams,
    config: &EngineConfig,
) -> ParameterResolution {
    let electorate = eligible_voters(round, participants, initiator);
    let counted: Vec<&ParameterVote> = round
        .parameter_votes
        .iter()
        .filter(|v| electorate.contains(&v.voter))
        .collect();

    let mrl_tally = tally_one(counted.iter().map(|v| v.mrl), electorate.len());
    let rtm_tally = tally_one(counted.iter().map(|v| v.rtm), electorate.len());
    let mrl_result = mrl_tally.winner();
    let rtm_result = rtm_tally.winner();

    let params = ResponseParams {
        // Integer truncation for MRL, then clamp
        max_response_length_chars: adjusted(
            current.max_response_length_chars as f64,
            mrl_result,
            config.vote_increment_pct,
        ) as u32,
        response_time_multiplier: adjusted(
            current.response_time_multiplier,
            rtm_result,
            config.vote_increment_pct,
        ),
        min_response_time_minutes: current.min_response_time_minutes,
    }
    .clamped(config);

    ParameterResolution {
        mrl_tally,
        rtm_tally,
        mrl_result,
        rtm_result,
        params,
    }
}
