//! Moderation use case: mutual removal

use crate::error::EngineError;
use crate::ports::clock::Clock;
use crate::ports::event_sink::{EngineEvent, EventSink};
use crate::ports::store::DiscussionStore;
use agora_domain::{DiscussionId, MutualRemovalEffect, UserId};
use std::sync::Arc;
use tracing::info;

/// Use case for participant-initiated removals
pub struct ModerationUseCase<S: DiscussionStore + 'static> {
    store: Arc<S>,
    events: Arc<dyn EventSink>,
    clock: Arc<dyn Clock>,
}

impl<S: DiscussionStore + 'static> ModerationUseCase<S> {
    pub fn new(store: Arc<S>, events: Arc<dyn EventSink>, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            events,
            clock,
        }
    }

    /// Execute a mutual removal between two participants
    pub async fn initiate_mutual_removal(
        &self,
        discussion: DiscussionId,
        initiator: UserId,
        target: UserId,
    ) -> Result<MutualRemovalEffect, EngineError> {
        let mut state = self.store.load(discussion).await?;
        let effect = state.initiate_mutual_removal(initiator, target, self.clock.now())?;
        self.store.save(state).await?;

        info!(
            discussion = %discussion,
            initiator = %initiator,
            target = %target,
            initiator_escalated = effect.initiator_escalated,
            target_escalated = effect.target_escalated,
            "mutual removal executed"
        );
        self.events.publish(EngineEvent::ParticipantRemoved {
            discussion,
            user: initiator,
            permanent: effect.initiator_escalated,
        });
        self.events.publish(EngineEvent::ParticipantRemoved {
            discussion,
            user: target,
            permanent: effect.target_escalated,
        });
        Ok(effect)
    }
}
