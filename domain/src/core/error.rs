//! Domain error types
//!
//! Precondition violations are rejected synchronously with a message naming
//! the invariant that was broken, so callers can surface a precise reason.
//! Concurrency conflicts are not represented here: they are detected at the
//! store boundary and treated as no-ops by the tick.

use crate::core::ids::{JoinRequestId, UserId};
use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("user {0} is not eligible to vote in this round")]
    NotEligibleToVote(UserId),

    #[error("voting window for round {0} is closed")]
    VotingClosed(u32),

    #[error("round {0} is not accepting responses")]
    RoundNotInProgress(u32),

    #[error("user {0} is not a participant in this discussion")]
    NotAParticipant(UserId),

    #[error("user {0} is not an active participant")]
    ParticipantNotActive(UserId),

    #[error("user {0} has not posted in the current round")]
    NotPostedThisRound(UserId),

    #[error("you cannot remove yourself")]
    SelfRemoval,

    #[error("duplicate removal: this pair has already removed each other")]
    DuplicateRemoval,

    #[error("join request {0} has already been processed")]
    RequestAlreadyResolved(JoinRequestId),

    #[error("join request {0} does not exist in this discussion")]
    UnknownJoinRequest(JoinRequestId),

    #[error("user {0} is already a participant in this discussion")]
    AlreadyParticipant(UserId),

    #[error("discussion is archived")]
    DiscussionArchived,

    #[error("response exceeds the maximum length of {max} characters (got {got})")]
    ResponseTooLong { max: u32, got: u32 },

    #[error("user {0} has already responded in this round")]
    AlreadyResponded(UserId),

    #[error("cannot rejoin: {0}")]
    CannotRejoin(RejoinDenied),
}

/// Why an observer may not return to active status right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejoinDenied {
    /// Permanent observers never rejoin
    Permanent,
    /// Temporary observer must wait for a later round
    MustWaitUntilRound(u32),
    /// The record carries no removal round to compute eligibility from
    RemovalRoundUnknown,
}

impl std::fmt::Display for RejoinDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RejoinDenied::Permanent => write!(f, "permanent observers cannot rejoin"),
            RejoinDenied::MustWaitUntilRound(n) => {
                write!(f, "eligible to rejoin from round {n}")
            }
            RejoinDenied::RemovalRoundUnknown => {
                write!(f, "removal round is unknown")
            }
        }
    }
}
