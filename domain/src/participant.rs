//! Participants, roles and observer demotion records
//!
//! A participant record tracks a user's standing within one discussion:
//! their role, how often they were removed or initiated removals, and the
//! bookkeeping an observer needs to compute reentry eligibility.

use crate::core::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A participant's standing in a discussion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Started the discussion; always vote-eligible
    Initiator,
    /// May post and vote
    Active,
    /// Demoted but may become eligible to return
    TemporaryObserver,
    /// Demoted with no path back
    PermanentObserver,
}

impl Role {
    pub fn is_active(self) -> bool {
        matches!(self, Role::Initiator | Role::Active)
    }

    pub fn is_observer(self) -> bool {
        matches!(self, Role::TemporaryObserver | Role::PermanentObserver)
    }
}

/// Why a participant was demoted to observer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObserverReason {
    /// Missed the round deadline without posting
    MrpExpired,
    /// Demoted through a mutual-removal exchange
    MutualRemoval,
    /// Voted out by the other participants
    VoteBasedRemoval,
}

/// A user's membership record within one discussion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub user: UserId,
    pub role: Role,
    pub joined_at: DateTime<Utc>,
    /// Set whenever the participant becomes an observer
    pub observer_since: Option<DateTime<Utc>>,
    pub observer_reason: Option<ObserverReason>,
    /// Round number in which the participant was removed
    pub removed_in_round: Option<u32>,
    /// Whether the participant had posted in the round they were removed from
    pub had_posted_when_removed: bool,
    /// Mutual removals this participant started, across the discussion
    pub removals_initiated: u32,
    /// Times this participant was the target of a mutual removal
    pub times_removed: u32,
    /// Platform-wide voting credit accrued through this discussion
    pub platform_credit: f64,
    /// Credit spendable within this discussion
    pub discussion_credit: u32,
}

impl Participant {
    pub fn new(user: UserId, role: Role, joined_at: DateTime<Utc>) -> Self {
        Self {
            user,
            role,
            joined_at,
            observer_since: None,
            observer_reason: None,
            removed_in_round: None,
            had_posted_when_removed: false,
            removals_initiated: 0,
            times_removed: 0,
            platform_credit: 0.0,
            discussion_credit: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.role.is_active()
    }

    /// Demote to temporary observer, recording the removal context
    pub fn demote(
        &mut self,
        reason: ObserverReason,
        round: u32,
        had_posted: bool,
        now: DateTime<Utc>,
    ) {
        self.role = Role::TemporaryObserver;
        self.observer_since = Some(now);
        self.observer_reason = Some(reason);
        self.removed_in_round = Some(round);
        self.had_posted_when_removed = had_posted;
    }

    /// Demote to permanent observer; vote-based removals also forfeit the
    /// platform credit earned here
    pub fn make_permanent(&mut self, reason: ObserverReason, round: u32, now: DateTime<Utc>) {
        self.role = Role::PermanentObserver;
        self.observer_since = Some(now);
        self.observer_reason = Some(reason);
        self.removed_in_round = Some(round);
        if reason == ObserverReason::VoteBasedRemoval {
            self.platform_credit = 0.0;
        }
    }

    /// Return a temporary observer to active standing
    pub fn restore(&mut self) {
        self.role = Role::Active;
        self.observer_since = None;
        self.observer_reason = None;
        self.removed_in_round = None;
        self.had_posted_when_removed = false;
    }
}
