//! Infrastructure layer for the agora deliberation engine
//!
//! Adapters for the application layer's ports: persistence, configuration
//! loading, event delivery, and time.

pub mod clock;
pub mod config;
pub mod events;
pub mod store;

// Re-export commonly used types
pub use clock::{ManualClock, SystemClock};
pub use config::{ConfigError, ConfigLoader, FileConfig, SchedulerConfig, SharedConfigProvider};
pub use events::TracingEventSink;
pub use store::MemoryStore;
