//! On-disk configuration shape

use agora_domain::EngineConfig;
use serde::{Deserialize, Serialize};

/// Scheduler settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Seconds between engine ticks
    pub tick_interval_seconds: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            tick_interval_seconds: 60,
        }
    }
}

/// Top-level configuration file layout
///
/// ```toml
/// [engine]
/// vote_increment_pct = 20
/// mrp_scope = "current_round"
///
/// [scheduler]
/// tick_interval_seconds = 60
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    pub engine: EngineConfig,
    pub scheduler: SchedulerConfig,
}
