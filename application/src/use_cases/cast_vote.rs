//! Vote casting use case
//!
//! Eligibility and window checks run inside the aggregate under the loaded
//! version, so a ballot racing a window close either lands before the
//! closing snapshot or is rejected - never half-counted.

use crate::error::EngineError;
use crate::ports::clock::Clock;
use crate::ports::config::ConfigProvider;
use crate::ports::store::DiscussionStore;
use agora_domain::{CreditAward, DiscussionId, JoinRequestId, UserId, VoteChoice};
use std::sync::Arc;
use tracing::debug;

/// Use case for casting ballots of every kind
pub struct CastVoteUseCase<S: DiscussionStore + 'static> {
    store: Arc<S>,
    config: Arc<dyn ConfigProvider>,
    clock: Arc<dyn Clock>,
}

impl<S: DiscussionStore + 'static> CastVoteUseCase<S> {
    pub fn new(store: Arc<S>, config: Arc<dyn ConfigProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Cast or re-cast an (MRL, RTM) parameter ballot
    pub async fn cast_parameter_vote(
        &self,
        discussion: DiscussionId,
        voter: UserId,
        mrl: VoteChoice,
        rtm: VoteChoice,
    ) -> Result<CreditAward, EngineError> {
        let config = self.config.snapshot();
        let mut state = self.store.load(discussion).await?;
        let award = state.cast_parameter_vote(voter, mrl, rtm, &config, self.clock.now())?;
        self.store.save(state).await?;
        debug!(discussion = %discussion, voter = %voter, ?award, "parameter vote recorded");
        Ok(award)
    }

    /// Cast or re-cast an approve/deny ballot on a join request
    pub async fn cast_join_request_vote(
        &self,
        discussion: DiscussionId,
        voter: UserId,
        request: JoinRequestId,
        approve: bool,
    ) -> Result<CreditAward, EngineError> {
        let config = self.config.snapshot();
        let mut state = self.store.load(discussion).await?;
        let award =
            state.cast_join_request_vote(voter, request, approve, &config, self.clock.now())?;
        self.store.save(state).await?;
        debug!(discussion = %discussion, voter = %voter, approve, "join request vote recorded");
        Ok(award)
    }

    /// Vote to remove a peer; tallied when the window closes
    pub async fn cast_removal_vote(
        &self,
        discussion: DiscussionId,
        voter: UserId,
        target: UserId,
    ) -> Result<(), EngineError> {
        let mut state = self.store.load(discussion).await?;
        state.cast_removal_vote(voter, target, self.clock.now())?;
        self.store.save(state).await?;
        debug!(discussion = %discussion, voter = %voter, target = %target, "removal vote recorded");
        Ok(())
    }
}
