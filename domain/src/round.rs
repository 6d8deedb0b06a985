//! Round entity, responses and the response timing tracker
//!
//! A round owns everything scoped to it: the responses, the three kinds of
//! ballots cast during its voting window, and the set of voters already
//! granted this round's participation credit. Keeping the ballots on the
//! round makes the composite uniqueness rules - one parameter vote per
//! (round, user), one join-request vote per (round, voter, request) - local
//! upsert operations instead of external constraints.

use crate::core::ids::UserId;
use crate::voting::join_request::JoinRequestVote;
use crate::voting::parameter::ParameterVote;
use crate::voting::removal::RemovalVote;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Lifecycle phase of a round; transitions are one-way
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundStatus {
    /// Accepting responses
    InProgress,
    /// Responses locked, voting window open
    Voting,
    /// Terminal; the next round exists or the discussion was archived
    Completed,
}

impl std::fmt::Display for RoundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RoundStatus::InProgress => write!(f, "in_progress"),
            RoundStatus::Voting => write!(f, "voting"),
            RoundStatus::Completed => write!(f, "completed"),
        }
    }
}

/// A participant's response within a round
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub author: UserId,
    pub character_count: u32,
    pub created_at: DateTime<Utc>,
    /// Minutes since the round's previous response; `None` for the first
    pub minutes_since_previous: Option<f64>,
    pub locked: bool,
}

/// One deliberation round of a discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// 1-based sequence number, unique within the discussion
    pub number: u32,
    pub status: RoundStatus,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    /// Deadline length in minutes from this round's own samples, assigned
    /// once the response threshold is met
    pub final_mrp_minutes: Option<f64>,
    /// Deadline carried over from the previous round, in effect until this
    /// round finalizes its own
    pub inherited_mrp_minutes: Option<f64>,
    pub responses: Vec<Response>,
    pub parameter_votes: Vec<ParameterVote>,
    pub join_request_votes: Vec<JoinRequestVote>,
    pub removal_votes: Vec<RemovalVote>,
    /// Voters already granted this round's participation credit
    pub credited_voters: BTreeSet<UserId>,
}

impl Round {
    pub fn open(number: u32, start_time: DateTime<Utc>) -> Self {
        Self {
            number,
            status: RoundStatus::InProgress,
            start_time,
            end_time: None,
            final_mrp_minutes: None,
            inherited_mrp_minutes: None,
            responses: Vec::new(),
            parameter_votes: Vec::new(),
            join_request_votes: Vec::new(),
            removal_votes: Vec::new(),
            credited_voters: BTreeSet::new(),
        }
    }

    /// The deadline currently governing this round: its own finalized MRP,
    /// or the inherited one until then
    pub fn effective_mrp_minutes(&self) -> Option<f64> {
        self.final_mrp_minutes.or(self.inherited_mrp_minutes)
    }

    /// Record a response, deriving its gap to the previous response
    pub fn record_response(&mut self, author: UserId, character_count: u32, now: DateTime<Utc>) {
        let minutes_since_previous = self
            .responses
            .last()
            .map(|prev| minutes_between(prev.created_at, now));
        self.responses.push(Response {
            author,
            character_count,
            created_at: now,
            minutes_since_previous,
            locked: false,
        });
    }

    /// Gap samples feeding the MRP calculator (first responses carry none)
    pub fn response_times(&self) -> impl Iterator<Item = f64> + '_ {
        self.responses
            .iter()
            .filter_map(|r| r.minutes_since_previous)
    }

    pub fn has_response_from(&self, user: UserId) -> bool {
        self.responses.iter().any(|r| r.author == user)
    }

    /// Authors who posted in this round, deduplicated
    pub fn responders(&self) -> BTreeSet<UserId> {
        self.responses.iter().map(|r| r.author).collect()
    }

    /// Timestamp expiry is measured from: the last response, or round start
    pub fn last_activity_at(&self) -> DateTime<Utc> {
        self.responses
            .last()
            .map(|r| r.created_at)
            .unwrap_or(self.start_time)
    }

    pub fn lock_responses(&mut self) {
        for response in &mut self.responses {
            response.locked = true;
        }
    }

    /// Upsert a parameter vote; recasting overwrites the previous ballot
    pub fn record_parameter_vote(&mut self, vote: ParameterVote) {
        match self
            .parameter_votes
            .iter_mut()
            .find(|v| v.voter == vote.voter)
        {
            Some(existing) => *existing = vote,
            None => self.parameter_votes.push(vote),
        }
    }

    /// Upsert a join-request vote, unique per (voter, request)
    pub fn record_join_request_vote(&mut self, vote: JoinRequestVote) {
        match self
            .join_request_votes
            .iter_mut()
            .find(|v| v.voter == vote.voter && v.request == vote.request)
        {
            Some(existing) => *existing = vote,
            None => self.join_request_votes.push(vote),
        }
    }

    /// Upsert a removal vote, unique per (voter, target)
    pub fn record_removal_vote(&mut self, vote: RemovalVote) {
        match self
            .removal_votes
            .iter_mut()
            .find(|v| v.voter == vote.voter && v.target == vote.target)
        {
            Some(existing) => *existing = vote,
            None => self.removal_votes.push(vote),
        }
    }
}

pub(crate) fn minutes_between(earlier: DateTime<Utc>, later: DateTime<Utc>) -> f64 {
    (later - earlier).num_seconds() as f64 / 60.0
}
