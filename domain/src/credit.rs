//! Voting participation credit tracker
//!
//! The first parameter or join-request vote a participant casts within a
//! round's voting window earns a fixed fractional platform credit and one
//! whole discussion credit. The round keeps the set of already-credited
//! voters, so a repeat award in the same round is a signalled no-op rather
//! than an error.

use crate::config::EngineConfig;
use crate::participant::Participant;
use crate::round::Round;
use serde::{Deserialize, Serialize};

/// Result of a credit award attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CreditAward {
    /// First vote this round; credit was granted
    Granted,
    /// Voter was already credited this round
    AlreadyAwarded,
}

impl CreditAward {
    pub fn is_new(self) -> bool {
        self == CreditAward::Granted
    }
}

/// Credit a voter for participating in this round's voting window
///
/// Add-if-absent on the round's credited set decides the outcome; only a
/// fresh insertion touches the balances.
pub fn award_voting_credit(
    round: &mut Round,
    participant: &mut Participant,
    config: &EngineConfig,
) -> CreditAward {
    if !round.credited_voters.insert(participant.user) {
        return CreditAward::AlreadyAwarded;
    }
    participant.platform_credit += config.platform_credit_per_vote;
    participant.discussion_credit += config.discussion_credit_per_vote;
    CreditAward::Granted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::UserId;
    use crate::participant::Role;
    use chrono::Utc;

    #[test]
    fn test_first_vote_grants_both_credits() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let mut round = Round::open(1, now);
        let mut voter = Participant::new(UserId::new(), Role::Active, now);

        let award = award_voting_credit(&mut round, &mut voter, &config);
        assert_eq!(award, CreditAward::Granted);
        assert!(award.is_new());
        assert_eq!(voter.platform_credit, 0.2);
        assert_eq!(voter.discussion_credit, 1);
        assert!(round.credited_voters.contains(&voter.user));
    }

    #[test]
    fn test_second_award_in_same_round_is_a_no_op() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let mut round = Round::open(1, now);
        let mut voter = Participant::new(UserId::new(), Role::Active, now);

        award_voting_credit(&mut round, &mut voter, &config);
        let repeat = award_voting_credit(&mut round, &mut voter, &config);

        assert_eq!(repeat, CreditAward::AlreadyAwarded);
        assert_eq!(voter.platform_credit, 0.2);
        assert_eq!(voter.discussion_credit, 1);
    }

    #[test]
    fn test_a_new_round_awards_again() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let mut first = Round::open(1, now);
        let mut second = Round::open(2, now);
        let mut voter = Participant::new(UserId::new(), Role::Active, now);

        award_voting_credit(&mut first, &mut voter, &config);
        let again = award_voting_credit(&mut second, &mut voter, &config);

        assert_eq!(again, CreditAward::Granted);
        assert!((voter.platform_credit - 0.4).abs() < 1e-9);
        assert_eq!(voter.discussion_credit, 2);
    }
}
