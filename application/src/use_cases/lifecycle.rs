//! Round lifecycle use case
//!
//! Drives the two scheduled transitions - round expiry and voting-window
//! close - as load/compute/save units of work against the versioned
//! aggregate. A save conflict means another tick already applied the same
//! transition; callers treat it as done.

use crate::error::EngineError;
use crate::ports::clock::Clock;
use crate::ports::config::ConfigProvider;
use crate::ports::event_sink::{EngineEvent, EventSink};
use crate::ports::store::DiscussionStore;
use agora_domain::{
    can_rejoin, lifecycle, DiscussionId, ExpiryOutcome, Role, TerminationReason, UserId,
    WindowCloseOutcome,
};
use std::sync::Arc;
use tracing::info;

/// Use case driving round transitions and archival
pub struct RoundLifecycleUseCase<S: DiscussionStore + 'static> {
    store: Arc<S>,
    config: Arc<dyn ConfigProvider>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl<S: DiscussionStore + 'static> RoundLifecycleUseCase<S> {
    pub fn new(
        store: Arc<S>,
        config: Arc<dyn ConfigProvider>,
        events: Arc<dyn EventSink>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            config,
            events,
            clock,
        }
    }

    /// Judge the current round against its deadline and advance it
    pub async fn advance_round_if_expired(
        &self,
        discussion: DiscussionId,
    ) -> Result<ExpiryOutcome, EngineError> {
        let config = self.config.snapshot();
        let now = self.clock.now();
        let mut state = self.store.load(discussion).await?;
        let round_number = state.current_round().number;
        let outcome = state.advance_if_expired(&config, now)?;
        if outcome == ExpiryOutcome::NotExpired {
            return Ok(outcome);
        }
        self.store.save(state).await?;

        match &outcome {
            ExpiryOutcome::MovedToVoting { demoted } => {
                info!(
                    discussion = %discussion,
                    round = round_number,
                    demoted = demoted.len(),
                    "round expired, voting window opened"
                );
                self.events.publish(EngineEvent::VotingOpened {
                    discussion,
                    round: round_number,
                });
                for user in demoted {
                    self.events.publish(EngineEvent::ParticipantRemoved {
                        discussion,
                        user: *user,
                        permanent: false,
                    });
                }
            }
            ExpiryOutcome::ArchivedQuiet => {
                info!(discussion = %discussion, "first round timed out, discussion archived");
                self.events.publish(EngineEvent::DiscussionArchived {
                    discussion,
                    reason: None,
                });
            }
            ExpiryOutcome::NotExpired => {}
        }
        Ok(outcome)
    }

    /// Close the voting window, resolving every vote kind
    pub async fn close_voting_window(
        &self,
        discussion: DiscussionId,
    ) -> Result<WindowCloseOutcome, EngineError> {
        let config = self.config.snapshot();
        let now = self.clock.now();
        let mut state = self.store.load(discussion).await?;
        let outcome = state.close_voting_window(&config, now)?;

        // Temporary observers whose wait ends with the new round.
        let newly_eligible: Vec<UserId> = match outcome.next_round {
            Some(next) => state
                .participants
                .iter()
                .filter(|p| p.role == Role::TemporaryObserver && can_rejoin(p, next))
                .map(|p| p.user)
                .collect(),
            None => Vec::new(),
        };
        self.store.save(state).await?;

        info!(
            discussion = %discussion,
            round = outcome.round_number,
            next_round = ?outcome.next_round,
            termination = ?outcome.termination,
            "voting window closed"
        );
        if outcome.parameters.changed_anything() {
            self.events.publish(EngineEvent::ParametersAdjusted {
                discussion,
                round: outcome.round_number,
            });
        }
        for removal in outcome.removals.iter().filter(|r| r.passed) {
            self.events.publish(EngineEvent::ParticipantRemoved {
                discussion,
                user: removal.target,
                permanent: true,
            });
        }
        match outcome.next_round {
            Some(next) => {
                self.events.publish(EngineEvent::RoundAdvanced {
                    discussion,
                    completed_round: outcome.round_number,
                    next_round: next,
                });
                for user in newly_eligible {
                    self.events
                        .publish(EngineEvent::RejoinEligible { discussion, user });
                }
            }
            None => {
                self.events.publish(EngineEvent::DiscussionArchived {
                    discussion,
                    reason: outcome.termination,
                });
            }
        }
        Ok(outcome)
    }

    /// Whether the discussion's voting window has elapsed
    pub async fn voting_window_elapsed(
        &self,
        discussion: DiscussionId,
    ) -> Result<bool, EngineError> {
        let state = self.store.load(discussion).await?;
        Ok(state.voting_window_elapsed(self.clock.now()))
    }

    /// Read-only rejoin eligibility check
    pub async fn can_rejoin(
        &self,
        discussion: DiscussionId,
        user: UserId,
    ) -> Result<bool, EngineError> {
        let state = self.store.load(discussion).await?;
        let current = state.current_round().number;
        Ok(state
            .participant(user)
            .map(|record| can_rejoin(record, current))
            .unwrap_or(false))
    }

    /// Read-only termination check against the current round
    pub async fn check_termination(
        &self,
        discussion: DiscussionId,
    ) -> Result<Option<TerminationReason>, EngineError> {
        let config = self.config.snapshot();
        let state = self.store.load(discussion).await?;
        Ok(lifecycle::check_termination(
            state.discussion.created_at,
            &state.rounds,
            state.current_round(),
            state.active_count(),
            &config,
            self.clock.now(),
        ))
    }
}
