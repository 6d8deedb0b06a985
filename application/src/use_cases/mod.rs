//! Engine use cases

pub mod cast_vote;
pub mod lifecycle;
pub mod moderation;
pub mod participation;
pub mod tick;

pub use cast_vote::CastVoteUseCase;
pub use lifecycle::RoundLifecycleUseCase;
pub use moderation::ModerationUseCase;
pub use participation::ParticipationUseCase;
pub use tick::{EngineTick, TickSummary};
