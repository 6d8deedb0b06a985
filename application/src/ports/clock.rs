//! Time source port
//!
//! Every use case reads the clock through this trait so the engine can be
//! driven deterministically in tests and in the demo simulation.

use chrono::{DateTime, Utc};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}
