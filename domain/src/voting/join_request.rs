//! Join-request voting resolver
//!
//! Pending requests to join a discussion are decided by simple approval
//! ratio at each voting-window close. Unlike parameter voting, anyone who
//! cast a ballot on a specific request is counted; eligibility is enforced
//! when the ballot is cast, not re-derived here.

use crate::core::ids::{JoinRequestId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle of a request to join a discussion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JoinRequestStatus {
    Pending,
    Approved,
    Declined,
}

/// A user asking to join an active discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinRequest {
    pub id: JoinRequestId,
    pub requester: UserId,
    pub status: JoinRequestStatus,
    pub created_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    /// Round number whose window resolved the request
    pub resolved_in_round: Option<u32>,
}

impl JoinRequest {
    pub fn new(requester: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: JoinRequestId::new(),
            requester,
            status: JoinRequestStatus::Pending,
            created_at: now,
            resolved_at: None,
            resolved_in_round: None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == JoinRequestStatus::Pending
    }
}

/// An approve/deny ballot on one request; unique per (round, voter, request)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinRequestVote {
    pub voter: UserId,
    pub request: JoinRequestId,
    pub approve: bool,
    pub cast_at: DateTime<Utc>,
}

/// How one pending request fared at window close
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JoinRequestOutcome {
    pub request: JoinRequestId,
    pub requester: UserId,
    pub approvals: usize,
    pub denials: usize,
    pub status: JoinRequestStatus,
}

/// Decide one pending request from the ballots cast this round
///
/// A strict majority of cast ballots decides; an exact split, or a window
/// with no ballots at all, leaves the request pending for the next round.
pub fn decide(request: &JoinRequest, votes: &[JoinRequestVote]) -> JoinRequestOutcome {
    let approvals = votes
        .iter()
        .filter(|v| v.request == request.id && v.approve)
        .count();
    let denials = votes
        .iter()
        .filter(|v| v.request == request.id && !v.approve)
        .count();
    let total = approvals + denials;

    let status = if total == 0 {
        JoinRequestStatus::Pending
    } else {
        let ratio = approvals as f64 / total as f64;
        if ratio > 0.5 {
            JoinRequestStatus::Approved
        } else if ratio < 0.5 {
            JoinRequestStatus::Declined
        } else {
            JoinRequestStatus::Pending
        }
    };

    JoinRequestOutcome {
        request: request.id,
        requester: request.requester,
        approvals,
        denials,
        status,
    }
}
