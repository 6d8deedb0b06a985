//! Periodic engine tick
//!
//! The engine is poll-driven: each tick scans the active discussions and
//! applies whichever transition each one is due for. Failures are scoped to
//! a single discussion; a conflict means another tick already did the work,
//! and both are logged and skipped rather than retried blindly.

use crate::error::EngineError;
use crate::ports::store::DiscussionStore;
use crate::use_cases::lifecycle::RoundLifecycleUseCase;
use agora_domain::ExpiryOutcome;
use std::sync::Arc;
use tracing::{debug, warn};

/// What one tick did across all discussions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickSummary {
    pub scanned: usize,
    pub rounds_expired: usize,
    pub windows_closed: usize,
    pub archived: usize,
    pub skipped: usize,
}

/// Scheduled driver over the lifecycle use case
pub struct EngineTick<S: DiscussionStore + 'static> {
    store: Arc<S>,
    lifecycle: Arc<RoundLifecycleUseCase<S>>,
}

impl<S: DiscussionStore + 'static> EngineTick<S> {
    pub fn new(store: Arc<S>, lifecycle: Arc<RoundLifecycleUseCase<S>>) -> Self {
        Self { store, lifecycle }
    }

    /// Scan every active discussion and apply due transitions
    pub async fn tick(&self) -> Result<TickSummary, EngineError> {
        let mut summary = TickSummary::default();
        let active = self.store.list_active().await?;
        summary.scanned = active.len();

        for discussion in active {
            match self.tick_discussion(discussion, &mut summary).await {
                Ok(()) => {}
                Err(err) if err.is_conflict() => {
                    debug!(discussion = %discussion, "tick lost the race, skipping");
                    summary.skipped += 1;
                }
                Err(err) => {
                    warn!(discussion = %discussion, error = %err, "tick failed for discussion");
                    summary.skipped += 1;
                }
            }
        }
        Ok(summary)
    }

    /// One discussion's unit of work: expire, then close if due
    async fn tick_discussion(
        &self,
        discussion: agora_domain::DiscussionId,
        summary: &mut TickSummary,
    ) -> Result<(), EngineError> {
        match self.lifecycle.advance_round_if_expired(discussion).await? {
            ExpiryOutcome::MovedToVoting { .. } => summary.rounds_expired += 1,
            ExpiryOutcome::ArchivedQuiet => {
                summary.archived += 1;
                return Ok(());
            }
            ExpiryOutcome::NotExpired => {}
        }

        if self.lifecycle.voting_window_elapsed(discussion).await? {
            let outcome = self.lifecycle.close_voting_window(discussion).await?;
            summary.windows_closed += 1;
            if outcome.termination.is_some() {
                summary.archived += 1;
            }
        }
        Ok(())
    }
}
