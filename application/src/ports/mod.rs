//! Port definitions: the interfaces the engine drives its collaborators
//! through. Implementations live in the infrastructure layer.

pub mod clock;
pub mod config;
pub mod event_sink;
pub mod store;

pub use clock::Clock;
pub use config::{ConfigProvider, StaticConfig};
pub use event_sink::{EngineEvent, EventSink, NullEventSink};
pub use store::{DiscussionStore, StoreError};
