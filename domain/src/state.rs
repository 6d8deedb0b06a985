//! Discussion aggregate
//!
//! `DiscussionState` is the transactional unit the engine operates on: the
//! discussion, its rounds, roster, join requests and moderation history,
//! plus a version counter for optimistic concurrency at the store boundary.
//! Every state transition runs through an aggregate method so the
//! invariants hold no matter which use case drives it.

use crate::config::EngineConfig;
use crate::core::error::DomainError;
use crate::core::ids::{JoinRequestId, UserId};
use crate::credit::{self, CreditAward};
use crate::discussion::{Discussion, ResponseParams};
use crate::lifecycle::{self, TerminationReason};
use crate::moderation::{self, ModerationAction, MutualRemovalEffect};
use crate::mrp;
use crate::observer;
use crate::participant::{ObserverReason, Participant, Role};
use crate::round::{Round, RoundStatus};
use crate::voting::join_request::{JoinRequest, JoinRequestOutcome, JoinRequestStatus, JoinRequestVote};
use crate::voting::parameter::{self, ParameterResolution, ParameterVote, VoteChoice};
use crate::voting::removal::{self, RemovalOutcome, RemovalVote};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything that happened when a voting window closed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WindowCloseOutcome {
    pub round_number: u32,
    pub parameters: ParameterResolution,
    pub join_requests: Vec<JoinRequestOutcome>,
    pub removals: Vec<RemovalOutcome>,
    /// `None` means a new round was opened
    pub termination: Option<TerminationReason>,
    /// Number of the newly opened round, when one was
    pub next_round: Option<u32>,
}

/// Result of judging a round against its deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ExpiryOutcome {
    /// Round is still within its deadline (or has none yet)
    NotExpired,
    /// Round moved to voting; these participants missed the deadline
    MovedToVoting { demoted: Vec<UserId> },
    /// First round timed out below its response threshold
    ArchivedQuiet,
}

/// One discussion's complete engine state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscussionState {
    pub discussion: Discussion,
    pub rounds: Vec<Round>,
    pub participants: Vec<Participant>,
    pub join_requests: Vec<JoinRequest>,
    pub moderation_actions: Vec<ModerationAction>,
    /// Incremented by the store on every successful save
    pub version: u64,
}

impl DiscussionState {
    /// Open a discussion with its first round and the initiator enrolled
    pub fn open(
        topic: impl Into<String>,
        initiator: UserId,
        params: ResponseParams,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            discussion: Discussion::new(topic, initiator, params, now),
            rounds: vec![Round::open(1, now)],
            participants: vec![Participant::new(initiator, Role::Initiator, now)],
            join_requests: Vec::new(),
            moderation_actions: Vec::new(),
            version: 0,
        }
    }

    // --- queries -----------------------------------------------------------

    /// The highest-numbered round; the aggregate always has at least one
    pub fn current_round(&self) -> &Round {
        // Rounds are only ever appended, so the last one is current.
        &self.rounds[self.rounds.len() - 1]
    }

    fn current_round_mut(&mut self) -> &mut Round {
        let idx = self.rounds.len() - 1;
        &mut self.rounds[idx]
    }

    pub fn round(&self, number: u32) -> Option<&Round> {
        self.rounds.iter().find(|r| r.number == number)
    }

    pub fn participant(&self, user: UserId) -> Option<&Participant> {
        self.participants.iter().find(|p| p.user == user)
    }

    fn participant_mut(&mut self, user: UserId) -> Option<&mut Participant> {
        self.participants.iter_mut().find(|p| p.user == user)
    }

    pub fn active_count(&self) -> usize {
        self.participants.iter().filter(|p| p.is_active()).count()
    }

    pub fn pending_join_requests(&self) -> impl Iterator<Item = &JoinRequest> {
        self.join_requests.iter().filter(|r| r.is_pending())
    }

    pub fn total_responses(&self) -> usize {
        self.rounds.iter().map(|r| r.responses.len()).sum()
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.discussion.is_active() {
            Ok(())
        } else {
            Err(DomainError::DiscussionArchived)
        }
    }

    fn ensure_active_participant(&self, user: UserId) -> Result<(), DomainError> {
        let record = self
            .participant(user)
            .ok_or(DomainError::NotAParticipant(user))?;
        if record.is_active() {
            Ok(())
        } else {
            Err(DomainError::ParticipantNotActive(user))
        }
    }

    // --- responses ---------------------------------------------------------

    /// Submit a response to the current round
    ///
    /// Finalizes the round's MRP once the response threshold is met.
    pub fn submit_response(
        &mut self,
        author: UserId,
        character_count: u32,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.ensure_active_participant(author)?;
        let max = self.discussion.params.max_response_length_chars;
        if character_count > max {
            return Err(DomainError::ResponseTooLong {
                max,
                got: character_count,
            });
        }
        let round = self.current_round();
        if round.status != RoundStatus::InProgress {
            return Err(DomainError::RoundNotInProgress(round.number));
        }
        if round.has_response_from(author) {
            return Err(DomainError::AlreadyResponded(author));
        }

        self.current_round_mut()
            .record_response(author, character_count, now);
        self.maybe_finalize_mrp(config);
        Ok(())
    }

    /// Assign `final_mrp_minutes` once the response threshold is reached
    fn maybe_finalize_mrp(&mut self, config: &EngineConfig) {
        let active = self.active_count();
        let round = self.current_round();
        if round.final_mrp_minutes.is_some() || lifecycle::in_phase_one(round, active, config) {
            return;
        }
        let number = round.number;
        let mrp = mrp::calculate_mrp(
            &self.rounds,
            number,
            &self.discussion.params,
            config.mrp_scope,
        );
        self.current_round_mut().final_mrp_minutes = Some(mrp);
    }

    // --- voting ------------------------------------------------------------

    /// Cast or re-cast an (MRL, RTM) ballot in the current voting window
    pub fn cast_parameter_vote(
        &mut self,
        voter: UserId,
        mrl: VoteChoice,
        rtm: VoteChoice,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<CreditAward, DomainError> {
        self.ensure_active()?;
        let round = self.current_round();
        if round.status != RoundStatus::Voting {
            return Err(DomainError::VotingClosed(round.number));
        }
        if !parameter::is_eligible(round, &self.participants, self.discussion.initiator, voter) {
            return Err(DomainError::NotEligibleToVote(voter));
        }

        let vote = ParameterVote::new(voter, mrl, rtm, now);
        let round_idx = self.rounds.len() - 1;
        self.rounds[round_idx].record_parameter_vote(vote);
        Ok(self.award_credit(voter, config))
    }

    /// Cast or re-cast an approve/deny ballot on a pending join request
    pub fn cast_join_request_vote(
        &mut self,
        voter: UserId,
        request: JoinRequestId,
        approve: bool,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<CreditAward, DomainError> {
        self.ensure_active()?;
        self.ensure_active_participant(voter)?;
        let round = self.current_round();
        if round.status != RoundStatus::Voting {
            return Err(DomainError::VotingClosed(round.number));
        }
        let record = self
            .join_requests
            .iter()
            .find(|r| r.id == request)
            .ok_or(DomainError::UnknownJoinRequest(request))?;
        if !record.is_pending() {
            return Err(DomainError::RequestAlreadyResolved(request));
        }

        let vote = JoinRequestVote {
            voter,
            request,
            approve,
            cast_at: now,
        };
        let round_idx = self.rounds.len() - 1;
        self.rounds[round_idx].record_join_request_vote(vote);
        Ok(self.award_credit(voter, config))
    }

    /// Vote to remove a disruptive peer; tallied at window close
    pub fn cast_removal_vote(
        &mut self,
        voter: UserId,
        target: UserId,
        now: DateTime<Utc>,
    ) -> Result<(), DomainError> {
        self.ensure_active()?;
        let round = self.current_round();
        if round.status != RoundStatus::InProgress {
            return Err(DomainError::RoundNotInProgress(round.number));
        }
        removal::check_vote(round, &self.participants, voter, target)?;
        let vote = RemovalVote {
            voter,
            target,
            cast_at: now,
        };
        let round_idx = self.rounds.len() - 1;
        self.rounds[round_idx].record_removal_vote(vote);
        Ok(())
    }

    fn award_credit(&mut self, voter: UserId, config: &EngineConfig) -> CreditAward {
        let round_idx = self.rounds.len() - 1;
        match self.participants.iter_mut().find(|p| p.user == voter) {
            Some(participant) => {
                credit::award_voting_credit(&mut self.rounds[round_idx], participant, config)
            }
            // The initiator always has a record; an eligible voter without
            // one cannot be credited.
            None => CreditAward::AlreadyAwarded,
        }
    }

    // --- join requests -----------------------------------------------------

    /// File a request to join; rejected for existing participants
    pub fn file_join_request(
        &mut self,
        requester: UserId,
        now: DateTime<Utc>,
    ) -> Result<JoinRequestId, DomainError> {
        self.ensure_active()?;
        if self.participant(requester).is_some() {
            return Err(DomainError::AlreadyParticipant(requester));
        }
        let request = JoinRequest::new(requester, now);
        let id = request.id;
        self.join_requests.push(request);
        Ok(id)
    }

    // --- moderation --------------------------------------------------------

    /// Mutual removal: demote both sides, record the action
    pub fn initiate_mutual_removal(
        &mut self,
        initiator: UserId,
        target: UserId,
        now: DateTime<Utc>,
    ) -> Result<MutualRemovalEffect, DomainError> {
        self.ensure_active()?;
        let round_idx = self.rounds.len() - 1;
        let effect = moderation::initiate_mutual_removal(
            &self.rounds[round_idx],
            &mut self.participants,
            &self.moderation_actions,
            initiator,
            target,
            now,
        )?;
        self.moderation_actions.push(effect.action.clone());
        Ok(effect)
    }

    /// Return an eligible temporary observer to active standing
    pub fn rejoin(&mut self, user: UserId) -> Result<(), DomainError> {
        self.ensure_active()?;
        let current = self.current_round().number;
        let record = self
            .participant(user)
            .ok_or(DomainError::NotAParticipant(user))?;
        observer::rejoin_eligibility(record, current).map_err(DomainError::CannotRejoin)?;
        if let Some(record) = self.participant_mut(user) {
            if record.role == Role::TemporaryObserver {
                record.restore();
            }
        }
        Ok(())
    }

    // --- lifecycle ---------------------------------------------------------

    /// Judge the current round against its deadline and advance it
    pub fn advance_if_expired(
        &mut self,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<ExpiryOutcome, DomainError> {
        self.ensure_active()?;
        let active = self.active_count();
        let round = self.current_round();
        if round.status != RoundStatus::InProgress {
            return Ok(ExpiryOutcome::NotExpired);
        }

        if lifecycle::phase_one_timed_out(round, active, config, now) {
            self.discussion.archive(now);
            self.current_round_mut().status = RoundStatus::Completed;
            self.current_round_mut().end_time = Some(now);
            return Ok(ExpiryOutcome::ArchivedQuiet);
        }

        let everyone_posted = lifecycle::all_active_responded(round, &self.participants);
        if !everyone_posted && !lifecycle::is_expired(round, now) {
            return Ok(ExpiryOutcome::NotExpired);
        }

        let round_number = self.current_round().number;
        let demoted: Vec<UserId> = self
            .participants
            .iter()
            .filter(|p| p.is_active() && !self.current_round().has_response_from(p.user))
            .map(|p| p.user)
            .collect();
        for user in &demoted {
            if let Some(record) = self.participants.iter_mut().find(|p| p.user == *user) {
                record.demote(ObserverReason::MrpExpired, round_number, false, now);
            }
        }

        let mrm_floor = self.discussion.params.min_response_time_minutes as f64;
        let round = self.current_round_mut();
        round.status = RoundStatus::Voting;
        round.end_time = Some(now);
        round.lock_responses();
        // A round ending under no deadline at all still needs a voting
        // window length; fall back to the MRM floor.
        if round.effective_mrp_minutes().is_none() {
            round.final_mrp_minutes = Some(mrm_floor);
        }
        Ok(ExpiryOutcome::MovedToVoting { demoted })
    }

    /// Whether the current round's voting window has elapsed
    pub fn voting_window_elapsed(&self, now: DateTime<Utc>) -> bool {
        let round = self.current_round();
        round.status == RoundStatus::Voting
            && lifecycle::voting_window_deadline(round).is_some_and(|deadline| now >= deadline)
    }

    /// Close the voting window: resolve every vote, then open the next
    /// round or archive
    pub fn close_voting_window(
        &mut self,
        config: &EngineConfig,
        now: DateTime<Utc>,
    ) -> Result<WindowCloseOutcome, DomainError> {
        self.ensure_active()?;
        let round = self.current_round();
        if round.status != RoundStatus::Voting {
            return Err(DomainError::VotingClosed(round.number));
        }
        let round_number = round.number;

        // Parameter votes first; the new values apply from the next round.
        let parameters = parameter::resolve(
            round,
            &self.participants,
            self.discussion.initiator,
            self.discussion.params,
            config,
        );
        self.discussion.params = parameters.params;

        // Vote-based removals next, so join-request admissions below are
        // not counted into the electorate they were never part of.
        let removal_outcomes = removal::resolve(self.current_round(), &self.participants, config);
        for outcome in removal_outcomes.iter().filter(|o| o.passed) {
            let action = moderation::apply_vote_based_removal(
                &mut self.participants,
                outcome.target,
                round_number,
                now,
            )?;
            self.moderation_actions.push(action);
        }

        // Join requests: each pending request is decided independently.
        let votes = self.current_round().join_request_votes.clone();
        let mut join_outcomes = Vec::new();
        for request in self.join_requests.iter_mut().filter(|r| r.is_pending()) {
            let outcome = crate::voting::join_request::decide(request, &votes);
            match outcome.status {
                JoinRequestStatus::Approved => {
                    request.status = JoinRequestStatus::Approved;
                    request.resolved_at = Some(now);
                    request.resolved_in_round = Some(round_number);
                    self.participants
                        .push(Participant::new(outcome.requester, Role::Active, now));
                }
                JoinRequestStatus::Declined => {
                    request.status = JoinRequestStatus::Declined;
                    request.resolved_at = Some(now);
                    request.resolved_in_round = Some(round_number);
                }
                JoinRequestStatus::Pending => {}
            }
            join_outcomes.push(outcome);
        }

        let previous_mrp = self.current_round().effective_mrp_minutes();
        self.current_round_mut().status = RoundStatus::Completed;

        let termination = lifecycle::check_termination(
            self.discussion.created_at,
            &self.rounds,
            self.current_round(),
            self.active_count(),
            config,
            now,
        );
        let next_round = match termination {
            Some(_) => {
                self.discussion.archive(now);
                None
            }
            None => {
                let number = round_number + 1;
                let mut next = Round::open(number, now);
                // The next round starts under the previous deadline until
                // its own samples finalize a new one.
                next.inherited_mrp_minutes = previous_mrp;
                self.rounds.push(next);
                Some(number)
            }
        };

        Ok(WindowCloseOutcome {
            round_number,
            parameters,
            join_requests: join_outcomes,
            removals: removal_outcomes,
            termination,
            next_round,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn state_with_members(n: usize, now: DateTime<Utc>) -> (DiscussionState, Vec<UserId>) {
        let initiator = UserId::new();
        let params = ResponseParams {
            max_response_length_chars: 1000,
            response_time_multiplier: 1.0,
            min_response_time_minutes: 30,
        };
        let mut state = DiscussionState::open("topic", initiator, params, now);
        let mut users = vec![initiator];
        for _ in 1..n {
            let user = UserId::new();
            state
                .participants
                .push(Participant::new(user, Role::Active, now));
            users.push(user);
        }
        (state, users)
    }

    fn respond_all(state: &mut DiscussionState, users: &[UserId], config: &EngineConfig, from: DateTime<Utc>) {
        for (i, user) in users.iter().enumerate() {
            state
                .submit_response(*user, 200, config, from + Duration::minutes(10 * i as i64))
                .unwrap();
        }
    }

    #[test]
    fn test_mrp_finalizes_at_the_response_threshold() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);

        state.submit_response(users[0], 200, &config, now).unwrap();
        assert_eq!(state.current_round().final_mrp_minutes, None);

        state
            .submit_response(users[1], 200, &config, now + Duration::minutes(10))
            .unwrap();
        // Single 10-minute gap, below the 30 minute MRM floor.
        assert_eq!(state.current_round().final_mrp_minutes, Some(30.0));
    }

    #[test]
    fn test_duplicate_response_is_rejected() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        state.submit_response(users[1], 200, &config, now).unwrap();
        assert_eq!(
            state.submit_response(users[1], 300, &config, now),
            Err(DomainError::AlreadyResponded(users[1]))
        );
    }

    #[test]
    fn test_overlong_response_is_rejected() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(2, now);
        assert_eq!(
            state.submit_response(users[0], 1500, &config, now),
            Err(DomainError::ResponseTooLong { max: 1000, got: 1500 })
        );
    }

    #[test]
    fn test_all_active_posting_ends_the_round() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        respond_all(&mut state, &users, &config, now);

        let outcome = state
            .advance_if_expired(&config, now + Duration::minutes(21))
            .unwrap();
        assert!(matches!(outcome, ExpiryOutcome::MovedToVoting { ref demoted } if demoted.is_empty()));
        assert_eq!(state.current_round().status, RoundStatus::Voting);
    }

    #[test]
    fn test_expiry_demotes_non_posters() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        state.submit_response(users[0], 200, &config, now).unwrap();
        state
            .submit_response(users[1], 200, &config, now + Duration::minutes(5))
            .unwrap();

        // MRP finalized at the floor (30); users[2] stays silent past it.
        let outcome = state
            .advance_if_expired(&config, now + Duration::minutes(40))
            .unwrap();
        match outcome {
            ExpiryOutcome::MovedToVoting { demoted } => assert_eq!(demoted, vec![users[2]]),
            other => panic!("unexpected outcome {other:?}"),
        }
        let record = state.participant(users[2]).unwrap();
        assert_eq!(record.role, Role::TemporaryObserver);
        assert_eq!(record.observer_reason, Some(ObserverReason::MrpExpired));
        assert!(!record.had_posted_when_removed);
    }

    #[test]
    fn test_round_without_mrp_does_not_expire() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        state.submit_response(users[0], 200, &config, now).unwrap();

        let outcome = state
            .advance_if_expired(&config, now + Duration::hours(10))
            .unwrap();
        assert_eq!(outcome, ExpiryOutcome::NotExpired);
    }

    #[test]
    fn test_quiet_first_round_archives() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        state.submit_response(users[0], 200, &config, now).unwrap();

        let outcome = state
            .advance_if_expired(&config, now + Duration::days(8))
            .unwrap();
        assert_eq!(outcome, ExpiryOutcome::ArchivedQuiet);
        assert!(!state.discussion.is_active());
    }

    #[test]
    fn test_votes_rejected_once_window_closes() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        respond_all(&mut state, &users, &config, now);
        state
            .advance_if_expired(&config, now + Duration::minutes(25))
            .unwrap();
        state
            .close_voting_window(&config, now + Duration::hours(2))
            .unwrap();

        // The new round is in_progress again, so ballots are refused.
        assert!(matches!(
            state.cast_parameter_vote(users[0], VoteChoice::Increase, VoteChoice::NoChange, &config, now),
            Err(DomainError::VotingClosed(_))
        ));
    }

    #[test]
    fn test_window_close_applies_parameters_and_opens_next_round() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        respond_all(&mut state, &users, &config, now);
        state
            .advance_if_expired(&config, now + Duration::minutes(25))
            .unwrap();

        let vote_at = now + Duration::minutes(30);
        for user in &users[1..] {
            state
                .cast_parameter_vote(*user, VoteChoice::Increase, VoteChoice::NoChange, &config, vote_at)
                .unwrap();
        }

        let previous_mrp = state.current_round().effective_mrp_minutes();
        let outcome = state
            .close_voting_window(&config, now + Duration::hours(2))
            .unwrap();

        assert_eq!(outcome.parameters.mrl_result, VoteChoice::Increase);
        assert_eq!(state.discussion.params.max_response_length_chars, 1200);
        assert_eq!(outcome.termination, None);
        assert_eq!(outcome.next_round, Some(2));
        assert_eq!(state.current_round().number, 2);
        assert_eq!(state.current_round().status, RoundStatus::InProgress);
        // Next round inherits the previous deadline until it has samples.
        assert_eq!(state.current_round().final_mrp_minutes, None);
        assert_eq!(state.current_round().inherited_mrp_minutes, previous_mrp);
    }

    #[test]
    fn test_next_round_finalizes_its_own_deadline() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        respond_all(&mut state, &users, &config, now);
        state
            .advance_if_expired(&config, now + Duration::minutes(21))
            .unwrap();
        state
            .close_voting_window(&config, now + Duration::hours(2))
            .unwrap();
        assert_eq!(state.current_round().inherited_mrp_minutes, Some(30.0));

        // Round 2 moves at a much slower pace; its own samples must replace
        // the carried-over deadline once the threshold is met.
        let start = now + Duration::hours(3);
        state.submit_response(users[0], 200, &config, start).unwrap();
        assert_eq!(state.current_round().final_mrp_minutes, None);
        state
            .submit_response(users[1], 200, &config, start + Duration::minutes(200))
            .unwrap();
        assert_eq!(state.current_round().final_mrp_minutes, Some(200.0));
        assert_eq!(state.current_round().effective_mrp_minutes(), Some(200.0));
    }

    #[test]
    fn test_first_vote_earns_credit_once() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        respond_all(&mut state, &users, &config, now);
        state
            .advance_if_expired(&config, now + Duration::minutes(25))
            .unwrap();

        let first = state
            .cast_parameter_vote(users[1], VoteChoice::Increase, VoteChoice::NoChange, &config, now)
            .unwrap();
        assert_eq!(first, CreditAward::Granted);

        // Recasting, or voting on a join request too, awards nothing more.
        let again = state
            .cast_parameter_vote(users[1], VoteChoice::Decrease, VoteChoice::NoChange, &config, now)
            .unwrap();
        assert_eq!(again, CreditAward::AlreadyAwarded);
        let record = state.participant(users[1]).unwrap();
        assert_eq!(record.platform_credit, 0.2);
        assert_eq!(record.discussion_credit, 1);
    }

    #[test]
    fn test_approved_join_request_admits_the_requester() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        let outsider = UserId::new();
        let request = state.file_join_request(outsider, now).unwrap();

        respond_all(&mut state, &users, &config, now);
        state
            .advance_if_expired(&config, now + Duration::minutes(25))
            .unwrap();
        for user in &users[..2] {
            state
                .cast_join_request_vote(*user, request, true, &config, now)
                .unwrap();
        }

        let outcome = state
            .close_voting_window(&config, now + Duration::hours(2))
            .unwrap();
        assert_eq!(outcome.join_requests.len(), 1);
        assert_eq!(outcome.join_requests[0].status, JoinRequestStatus::Approved);
        let admitted = state.participant(outsider).unwrap();
        assert_eq!(admitted.role, Role::Active);
    }

    #[test]
    fn test_unvoted_join_request_carries_to_next_window() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        let outsider = UserId::new();
        state.file_join_request(outsider, now).unwrap();

        respond_all(&mut state, &users, &config, now);
        state
            .advance_if_expired(&config, now + Duration::minutes(25))
            .unwrap();
        state
            .close_voting_window(&config, now + Duration::hours(2))
            .unwrap();

        assert_eq!(state.pending_join_requests().count(), 1);
        assert!(state.participant(outsider).is_none());
    }

    #[test]
    fn test_passed_removal_vote_is_applied_at_close() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(4, now);
        respond_all(&mut state, &users, &config, now);

        let target = users[3];
        state.cast_removal_vote(users[0], target, now).unwrap();
        state.cast_removal_vote(users[1], target, now).unwrap();

        state
            .advance_if_expired(&config, now + Duration::minutes(35))
            .unwrap();
        let outcome = state
            .close_voting_window(&config, now + Duration::hours(2))
            .unwrap();

        assert!(outcome.removals.iter().any(|r| r.target == target && r.passed));
        let record = state.participant(target).unwrap();
        assert_eq!(record.role, Role::PermanentObserver);
        assert_eq!(record.observer_reason, Some(ObserverReason::VoteBasedRemoval));
        assert!(state
            .moderation_actions
            .iter()
            .any(|a| a.kind == crate::moderation::ModerationKind::VoteBasedRemoval));
    }

    #[test]
    fn test_close_with_one_active_left_archives() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(2, now);
        state.submit_response(users[0], 200, &config, now).unwrap();
        state
            .submit_response(users[1], 200, &config, now + Duration::minutes(5))
            .unwrap();
        state
            .advance_if_expired(&config, now + Duration::minutes(40))
            .unwrap();

        // Demote one side so a single active participant remains.
        state
            .initiate_mutual_removal(users[0], users[1], now)
            .unwrap_err();
        if let Some(p) = state.participants.iter_mut().find(|p| p.user == users[1]) {
            p.demote(ObserverReason::MutualRemoval, 1, true, now);
        }

        let outcome = state
            .close_voting_window(&config, now + Duration::hours(2))
            .unwrap();
        assert_eq!(
            outcome.termination,
            Some(TerminationReason::NoActiveParticipants)
        );
        assert!(!state.discussion.is_active());
        assert_eq!(outcome.next_round, None);
    }

    #[test]
    fn test_rejoin_roundtrip() {
        let now = Utc::now();
        let config = EngineConfig::default();
        let (mut state, users) = state_with_members(3, now);
        state.submit_response(users[0], 200, &config, now).unwrap();
        state
            .submit_response(users[1], 200, &config, now + Duration::minutes(5))
            .unwrap();
        state
            .advance_if_expired(&config, now + Duration::minutes(40))
            .unwrap();

        // users[2] missed the deadline in round 1; they may rejoin from
        // round 2.
        assert!(matches!(
            state.rejoin(users[2]),
            Err(DomainError::CannotRejoin(_))
        ));
        state
            .close_voting_window(&config, now + Duration::hours(2))
            .unwrap();
        state.rejoin(users[2]).unwrap();
        assert_eq!(state.participant(users[2]).unwrap().role, Role::Active);
    }
}
