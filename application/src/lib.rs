//! Application layer for the agora deliberation engine
//!
//! This crate contains use cases, port definitions, and the tick scheduler.
//! It depends only on the domain layer.

pub mod error;
pub mod ports;
pub mod scheduler;
#[cfg(test)]
pub(crate) mod testing;
pub mod use_cases;

// Re-export commonly used types
pub use error::EngineError;
pub use ports::{
    clock::Clock,
    config::{ConfigProvider, StaticConfig},
    event_sink::{EngineEvent, EventSink, NullEventSink},
    store::{DiscussionStore, StoreError},
};
pub use scheduler::run_scheduler;
pub use use_cases::{
    CastVoteUseCase, EngineTick, ModerationUseCase, ParticipationUseCase, RoundLifecycleUseCase,
    TickSummary,
};
