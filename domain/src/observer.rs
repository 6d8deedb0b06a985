//! Observer reentry calculator
//!
//! Pure function of a role record and the current round number. It never
//! mutates the roster; callers apply the role change once an eligible
//! observer actually rejoins.

use crate::core::error::RejoinDenied;
use crate::participant::{ObserverReason, Participant, Role};

/// When, in round numbers, an observer may return to active standing
pub fn rejoin_eligibility(record: &Participant, current_round: u32) -> Result<(), RejoinDenied> {
    if record.role == Role::PermanentObserver {
        return Err(RejoinDenied::Permanent);
    }
    if record.role != Role::TemporaryObserver {
        // Already active; nothing to wait for.
        return Ok(());
    }

    let reason = match record.observer_reason {
        Some(reason) => reason,
        None => return Ok(()),
    };
    let removed_in = match record.removed_in_round {
        Some(n) => n,
        None => return Err(RejoinDenied::RemovalRoundUnknown),
    };

    let earliest = match reason {
        ObserverReason::VoteBasedRemoval => return Err(RejoinDenied::Permanent),
        // Posted before missing the deadline: no wait. Otherwise sit out the
        // rest of the removal round.
        ObserverReason::MrpExpired => {
            if record.had_posted_when_removed {
                removed_in
            } else {
                removed_in + 1
            }
        }
        // Having posted makes the removal costlier: skip the whole next
        // round too.
        ObserverReason::MutualRemoval => {
            if record.had_posted_when_removed {
                removed_in + 2
            } else {
                removed_in + 1
            }
        }
    };

    if current_round >= earliest {
        Ok(())
    } else {
        Err(RejoinDenied::MustWaitUntilRound(earliest))
    }
}

/// Whether the observer may return to active status this round
pub fn can_rejoin(record: &Participant, current_round: u32) -> bool {
    rejoin_eligibility(record, current_round).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::UserId;
    use chrono::Utc;

    fn observer(reason: ObserverReason, round: u32, had_posted: bool) -> Participant {
        let now = Utc::now();
        let mut p = Participant::new(UserId::new(), Role::Active, now);
        p.demote(reason, round, had_posted, now);
        p
    }

    #[test]
    fn test_permanent_observer_never_rejoins() {
        let now = Utc::now();
        let mut p = Participant::new(UserId::new(), Role::Active, now);
        p.make_permanent(ObserverReason::MutualRemoval, 3, now);
        assert_eq!(rejoin_eligibility(&p, 100), Err(RejoinDenied::Permanent));
    }

    #[test]
    fn test_vote_based_removal_never_rejoins() {
        let p = observer(ObserverReason::VoteBasedRemoval, 3, true);
        assert_eq!(rejoin_eligibility(&p, 100), Err(RejoinDenied::Permanent));
    }

    #[test]
    fn test_mrp_expired_after_posting_is_immediate() {
        let p = observer(ObserverReason::MrpExpired, 3, true);
        assert!(can_rejoin(&p, 3));
    }

    #[test]
    fn test_mrp_expired_without_posting_waits_one_round() {
        let p = observer(ObserverReason::MrpExpired, 3, false);
        assert_eq!(
            rejoin_eligibility(&p, 3),
            Err(RejoinDenied::MustWaitUntilRound(4))
        );
        assert!(can_rejoin(&p, 4));
    }

    #[test]
    fn test_mutual_removal_after_posting_skips_the_next_round() {
        let p = observer(ObserverReason::MutualRemoval, 3, true);
        assert_eq!(
            rejoin_eligibility(&p, 4),
            Err(RejoinDenied::MustWaitUntilRound(5))
        );
        assert!(can_rejoin(&p, 5));
    }

    #[test]
    fn test_mutual_removal_without_posting_waits_one_round() {
        let p = observer(ObserverReason::MutualRemoval, 3, false);
        assert!(!can_rejoin(&p, 3));
        assert!(can_rejoin(&p, 4));
    }

    #[test]
    fn test_active_participant_has_nothing_to_wait_for() {
        let p = Participant::new(UserId::new(), Role::Active, Utc::now());
        assert!(can_rejoin(&p, 1));
    }

    #[test]
    fn test_missing_removal_round_is_denied() {
        let mut p = observer(ObserverReason::MutualRemoval, 3, false);
        p.removed_in_round = None;
        assert_eq!(
            rejoin_eligibility(&p, 10),
            Err(RejoinDenied::RemovalRoundUnknown)
        );
    }
}
