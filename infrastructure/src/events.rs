//! Event sink adapters

use agora_application::ports::event_sink::{EngineEvent, EventSink};
use tracing::info;

/// Sink that logs every engine event through `tracing`
///
/// Delivery is fire-and-forget by construction: logging cannot fail the
/// transition that produced the event.
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn publish(&self, event: EngineEvent) {
        match &event {
            EngineEvent::VotingOpened { discussion, round } => {
                info!(%discussion, round, "event: voting opened");
            }
            EngineEvent::RoundAdvanced {
                discussion,
                completed_round,
                next_round,
            } => {
                info!(%discussion, completed_round, next_round, "event: round advanced");
            }
            EngineEvent::ParametersAdjusted { discussion, round } => {
                info!(%discussion, round, "event: parameters adjusted");
            }
            EngineEvent::ParticipantRemoved {
                discussion,
                user,
                permanent,
            } => {
                info!(%discussion, %user, permanent, "event: participant removed");
            }
            EngineEvent::RejoinEligible { discussion, user } => {
                info!(%discussion, %user, "event: rejoin eligible");
            }
            EngineEvent::DiscussionArchived { discussion, reason } => {
                info!(%discussion, ?reason, "event: discussion archived");
            }
        }
    }
}
