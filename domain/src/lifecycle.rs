//! Round lifecycle predicates and discussion termination rules
//!
//! The lifecycle manager in the application layer is a thin driver over
//! these pure functions: it loads state, asks the predicates here what has
//! to happen, and writes the results back. Keeping the timing arithmetic
//! and the termination ordering free of I/O makes every transition testable
//! with plain values.

use crate::config::EngineConfig;
use crate::participant::Participant;
use crate::round::{minutes_between, Round};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Responses needed before the round's deadline is finalized
///
/// Small discussions finalize early: the threshold never exceeds the number
/// of active participants.
pub fn phase_one_threshold(active_count: usize, config: &EngineConfig) -> usize {
    (config.responses_before_mrp as usize).min(active_count.max(1))
}

/// Whether the round is still collecting responses toward its threshold
pub fn in_phase_one(round: &Round, active_count: usize, config: &EngineConfig) -> bool {
    round.responses.len() < phase_one_threshold(active_count, config)
}

/// Whether the round's deadline has elapsed
///
/// A round with no deadline, finalized or inherited, cannot expire. Expiry
/// is measured from the last response, or from round start when nobody has
/// posted.
pub fn is_expired(round: &Round, now: DateTime<Utc>) -> bool {
    match round.effective_mrp_minutes() {
        Some(mrp) => minutes_between(round.last_activity_at(), now) >= mrp,
        None => false,
    }
}

/// Whether every active participant has posted, ending the round early
pub fn all_active_responded(round: &Round, participants: &[Participant]) -> bool {
    let active: Vec<_> = participants.iter().filter(|p| p.is_active()).collect();
    !active.is_empty() && active.iter().all(|p| round.has_response_from(p.user))
}

/// When the voting window closes: round end plus the same deadline length
pub fn voting_window_deadline(round: &Round) -> Option<DateTime<Utc>> {
    let end = round.end_time?;
    let mrp = round.effective_mrp_minutes()?;
    Some(end + Duration::seconds((mrp * 60.0) as i64))
}

/// Whether a first round has sat below its response threshold for too long
pub fn phase_one_timed_out(
    round: &Round,
    active_count: usize,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> bool {
    round.number == 1
        && in_phase_one(round, active_count, config)
        && now - round.start_time >= Duration::days(config.round_one_timeout_days as i64)
}

/// Why a discussion was archived instead of getting another round
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// One or zero active participants remain
    NoActiveParticipants,
    /// The just-completed round drew at most one response
    TooFewResponses,
    DurationCapReached,
    RoundCapReached,
    ResponseCapReached,
}

impl std::fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TerminationReason::NoActiveParticipants => {
                write!(f, "no active participants remain")
            }
            TerminationReason::TooFewResponses => {
                write!(f, "too few responses in the last round")
            }
            TerminationReason::DurationCapReached => {
                write!(f, "maximum discussion duration reached")
            }
            TerminationReason::RoundCapReached => write!(f, "maximum round count reached"),
            TerminationReason::ResponseCapReached => {
                write!(f, "maximum response count reached")
            }
        }
    }
}

/// Decide whether the discussion ends after `latest` completes
///
/// Checks run in a fixed order and the first match wins. A cap configured
/// as 0 is disabled.
pub fn check_termination(
    discussion_created_at: DateTime<Utc>,
    rounds: &[Round],
    latest: &Round,
    active_count: usize,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> Option<TerminationReason> {
    if active_count <= 1 {
        return Some(TerminationReason::NoActiveParticipants);
    }
    if latest.responses.len() <= 1 {
        return Some(TerminationReason::TooFewResponses);
    }
    if config.max_discussion_duration_days > 0
        && now - discussion_created_at
            >= Duration::days(config.max_discussion_duration_days as i64)
    {
        return Some(TerminationReason::DurationCapReached);
    }
    if config.max_discussion_rounds > 0 && latest.number >= config.max_discussion_rounds {
        return Some(TerminationReason::RoundCapReached);
    }
    let total_responses: usize = rounds.iter().map(|r| r.responses.len()).sum();
    if config.max_discussion_responses > 0
        && total_responses >= config.max_discussion_responses as usize
    {
        return Some(TerminationReason::ResponseCapReached);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ids::UserId;
    use crate::participant::Role;

    fn round_with_responses(number: u32, count: usize, start: DateTime<Utc>) -> Round {
        let mut round = Round::open(number, start);
        for i in 0..count {
            round.record_response(UserId::new(), 200, start + Duration::minutes(i as i64));
        }
        round
    }

    fn actives(n: usize) -> Vec<Participant> {
        (0..n)
            .map(|i| {
                let role = if i == 0 { Role::Initiator } else { Role::Active };
                Participant::new(UserId::new(), role, Utc::now())
            })
            .collect()
    }

    #[test]
    fn test_threshold_never_exceeds_active_count() {
        let config = EngineConfig {
            responses_before_mrp: 5,
            ..Default::default()
        };
        assert_eq!(phase_one_threshold(2, &config), 2);
        assert_eq!(phase_one_threshold(10, &config), 5);
        assert_eq!(phase_one_threshold(0, &config), 1);
    }

    #[test]
    fn test_round_without_mrp_never_expires() {
        let start = Utc::now() - Duration::days(30);
        let round = Round::open(1, start);
        assert!(!is_expired(&round, Utc::now()));
    }

    #[test]
    fn test_expiry_measures_from_last_response() {
        let start = Utc::now() - Duration::minutes(100);
        let mut round = round_with_responses(1, 1, start);
        round.final_mrp_minutes = Some(30.0);

        // Last response was 100 minutes ago, well past the 30 minute MRP.
        assert!(is_expired(&round, Utc::now()));

        round.record_response(UserId::new(), 200, Utc::now() - Duration::minutes(10));
        assert!(!is_expired(&round, Utc::now()));
    }

    #[test]
    fn test_expiry_falls_back_to_round_start() {
        let start = Utc::now() - Duration::minutes(45);
        let mut round = Round::open(1, start);
        round.final_mrp_minutes = Some(30.0);
        assert!(is_expired(&round, Utc::now()));
    }

    #[test]
    fn test_inherited_deadline_drives_expiry() {
        let start = Utc::now() - Duration::minutes(45);
        let mut round = Round::open(2, start);
        round.inherited_mrp_minutes = Some(30.0);
        assert!(is_expired(&round, Utc::now()));
    }

    #[test]
    fn test_all_active_responded() {
        let start = Utc::now();
        let participants = actives(3);
        let mut round = Round::open(1, start);
        for p in &participants[..2] {
            round.record_response(p.user, 200, start);
        }
        assert!(!all_active_responded(&round, &participants));

        round.record_response(participants[2].user, 200, start);
        assert!(all_active_responded(&round, &participants));
    }

    #[test]
    fn test_voting_window_deadline_reuses_the_mrp() {
        let start = Utc::now();
        let mut round = Round::open(1, start);
        assert_eq!(voting_window_deadline(&round), None);

        round.end_time = Some(start + Duration::hours(1));
        round.final_mrp_minutes = Some(30.0);
        assert_eq!(
            voting_window_deadline(&round),
            Some(start + Duration::hours(1) + Duration::minutes(30))
        );
    }

    #[test]
    fn test_first_round_times_out_below_threshold() {
        let config = EngineConfig::default();
        let start = Utc::now() - Duration::days(8);
        let quiet = round_with_responses(1, 1, start);
        assert!(phase_one_timed_out(&quiet, 4, &config, Utc::now()));

        // Same round but past its threshold does not time out this way.
        let busy = round_with_responses(1, 2, start);
        assert!(!phase_one_timed_out(&busy, 4, &config, Utc::now()));

        // Later rounds never use the first-round timeout.
        let later = round_with_responses(2, 1, start);
        assert!(!phase_one_timed_out(&later, 4, &config, Utc::now()));
    }

    #[test]
    fn test_termination_order_first_match_wins() {
        let config = EngineConfig {
            max_discussion_rounds: 3,
            ..Default::default()
        };
        let created = Utc::now() - Duration::days(1);
        let latest = round_with_responses(3, 1, Utc::now());

        // Both TooFewResponses and RoundCapReached hold; the response check
        // runs first.
        let reason = check_termination(created, &[latest.clone()], &latest, 4, &config, Utc::now());
        assert_eq!(reason, Some(TerminationReason::TooFewResponses));
    }

    #[test]
    fn test_no_active_participants_terminates() {
        let config = EngineConfig::default();
        let latest = round_with_responses(1, 3, Utc::now());
        let reason = check_termination(
            Utc::now(),
            &[latest.clone()],
            &latest,
            1,
            &config,
            Utc::now(),
        );
        assert_eq!(reason, Some(TerminationReason::NoActiveParticipants));
    }

    #[test]
    fn test_duration_and_round_caps() {
        let config = EngineConfig::default();
        let created = Utc::now() - Duration::days(91);
        let latest = round_with_responses(2, 3, Utc::now());
        let reason = check_termination(
            created,
            &[latest.clone()],
            &latest,
            4,
            &config,
            Utc::now(),
        );
        assert_eq!(reason, Some(TerminationReason::DurationCapReached));

        let capped = EngineConfig {
            max_discussion_rounds: 2,
            ..Default::default()
        };
        let reason = check_termination(
            Utc::now(),
            &[latest.clone()],
            &latest,
            4,
            &capped,
            Utc::now(),
        );
        assert_eq!(reason, Some(TerminationReason::RoundCapReached));
    }

    #[test]
    fn test_response_cap_counts_across_rounds() {
        let config = EngineConfig {
            max_discussion_responses: 5,
            ..Default::default()
        };
        let start = Utc::now();
        let earlier = round_with_responses(1, 3, start);
        let latest = round_with_responses(2, 2, start);
        let reason = check_termination(
            start,
            &[earlier, latest.clone()],
            &latest,
            4,
            &config,
            Utc::now(),
        );
        assert_eq!(reason, Some(TerminationReason::ResponseCapReached));
    }

    #[test]
    fn test_zero_caps_are_disabled() {
        let config = EngineConfig {
            max_discussion_duration_days: 0,
            max_discussion_rounds: 0,
            max_discussion_responses: 0,
            ..Default::default()
        };
        let created = Utc::now() - Duration::days(1000);
        let latest = round_with_responses(999, 3, Utc::now());
        let reason = check_termination(
            created,
            &[latest.clone()],
            &latest,
            4,
            &config,
            Utc::now(),
        );
        assert_eq!(reason, None);
    }
}
