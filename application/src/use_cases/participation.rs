//! Participation use case: opening discussions, responding, joining

use crate::error::EngineError;
use crate::ports::clock::Clock;
use crate::ports::config::ConfigProvider;
use crate::ports::store::DiscussionStore;
use agora_domain::{DiscussionId, DiscussionState, JoinRequestId, ResponseParams, UserId};
use std::sync::Arc;
use tracing::info;

/// Use case for user-facing participation actions
pub struct ParticipationUseCase<S: DiscussionStore + 'static> {
    store: Arc<S>,
    config: Arc<dyn ConfigProvider>,
    clock: Arc<dyn Clock>,
}

impl<S: DiscussionStore + 'static> ParticipationUseCase<S> {
    pub fn new(store: Arc<S>, config: Arc<dyn ConfigProvider>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            config,
            clock,
        }
    }

    /// Open a new discussion with its first round
    ///
    /// The initial parameters are clamped into the configured bounds before
    /// anything is persisted.
    pub async fn open_discussion(
        &self,
        topic: impl Into<String>,
        initiator: UserId,
        params: ResponseParams,
    ) -> Result<DiscussionId, EngineError> {
        let config = self.config.snapshot();
        let state = DiscussionState::open(
            topic,
            initiator,
            params.clamped(&config),
            self.clock.now(),
        );
        let id = state.discussion.id;
        self.store.insert(state).await?;
        info!(discussion = %id, "discussion opened");
        Ok(id)
    }

    /// Submit the author's response to the current round
    pub async fn submit_response(
        &self,
        discussion: DiscussionId,
        author: UserId,
        character_count: u32,
    ) -> Result<(), EngineError> {
        let config = self.config.snapshot();
        let mut state = self.store.load(discussion).await?;
        state.submit_response(author, character_count, &config, self.clock.now())?;
        self.store.save(state).await?;
        Ok(())
    }

    /// File a request to join an active discussion
    pub async fn file_join_request(
        &self,
        discussion: DiscussionId,
        requester: UserId,
    ) -> Result<JoinRequestId, EngineError> {
        let mut state = self.store.load(discussion).await?;
        let id = state.file_join_request(requester, self.clock.now())?;
        self.store.save(state).await?;
        info!(discussion = %discussion, requester = %requester, "join request filed");
        Ok(id)
    }

    /// Return an eligible temporary observer to active standing
    pub async fn rejoin(
        &self,
        discussion: DiscussionId,
        user: UserId,
    ) -> Result<(), EngineError> {
        let mut state = self.store.load(discussion).await?;
        state.rejoin(user)?;
        self.store.save(state).await?;
        info!(discussion = %discussion, user = %user, "observer rejoined");
        Ok(())
    }
}
