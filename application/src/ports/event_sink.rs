//! Engine event notification port
//!
//! Fire-and-forget: the engine publishes what happened and moves on. A sink
//! that fails must swallow the failure; delivery is never allowed to block
//! or fail a state transition.

use agora_domain::{DiscussionId, TerminationReason, UserId};
use serde::{Deserialize, Serialize};

/// Notifications emitted by the engine as state transitions commit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineEvent {
    /// A round expired and its voting window opened
    VotingOpened {
        discussion: DiscussionId,
        round: u32,
    },
    /// A voting window closed and the next round opened
    RoundAdvanced {
        discussion: DiscussionId,
        completed_round: u32,
        next_round: u32,
    },
    /// Parameter voting changed the discussion's parameters
    ParametersAdjusted {
        discussion: DiscussionId,
        round: u32,
    },
    /// A participant was demoted to observer
    ParticipantRemoved {
        discussion: DiscussionId,
        user: UserId,
        permanent: bool,
    },
    /// A temporary observer became eligible to return
    RejoinEligible {
        discussion: DiscussionId,
        user: UserId,
    },
    /// The discussion ended
    DiscussionArchived {
        discussion: DiscussionId,
        reason: Option<TerminationReason>,
    },
}

/// Outbound notification channel
pub trait EventSink: Send + Sync {
    fn publish(&self, event: EngineEvent);
}

/// Sink that drops every event, for tests and the demo driver
pub struct NullEventSink;

impl EventSink for NullEventSink {
    fn publish(&self, _event: EngineEvent) {}
}
