//! Domain layer for the agora deliberation engine
//!
//! This crate contains the core business logic, entities, and value objects.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Rounds
//!
//! A discussion advances through numbered rounds. Each round accepts one
//! response per active participant, then opens a voting window where the
//! group adjusts the discussion's parameters, decides join requests, and
//! tallies removal votes. The deadline for each round - the MRP - is
//! computed from how quickly the group has actually been responding.
//!
//! ## Moderation
//!
//! - **Mutual removal**: a participant may eject a peer at the cost of
//!   their own seat; both become temporary observers.
//! - **Vote-based removal**: the group may vote a disruptive peer out
//!   permanently.
//!
//! Temporary observers earn their way back in by round number; permanent
//! observers never do.

pub mod config;
pub mod core;
pub mod credit;
pub mod discussion;
pub mod lifecycle;
pub mod moderation;
pub mod mrp;
pub mod observer;
pub mod participant;
pub mod round;
pub mod state;
pub mod voting;

// Re-export commonly used types
pub use config::{ConfigValidationError, EngineConfig, MrpScope};
pub use core::{
    error::{DomainError, RejoinDenied},
    ids::{DiscussionId, JoinRequestId, UserId},
};
pub use credit::CreditAward;
pub use discussion::{Discussion, DiscussionStatus, ResponseParams};
pub use lifecycle::TerminationReason;
pub use moderation::{ModerationAction, ModerationKind, MutualRemovalEffect};
pub use observer::{can_rejoin, rejoin_eligibility};
pub use participant::{ObserverReason, Participant, Role};
pub use round::{Response, Round, RoundStatus};
pub use state::{DiscussionState, ExpiryOutcome, WindowCloseOutcome};
pub use voting::{
    join_request::{JoinRequest, JoinRequestOutcome, JoinRequestStatus, JoinRequestVote},
    parameter::{ParameterResolution, ParameterVote, VoteChoice, VoteTally},
    removal::{RemovalOutcome, RemovalVote},
};
