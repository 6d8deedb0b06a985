//! Configuration loading and the `ConfigProvider` adapter

pub mod file_config;
pub mod loader;
pub mod provider;

pub use file_config::{FileConfig, SchedulerConfig};
pub use loader::{ConfigError, ConfigLoader};
pub use provider::SharedConfigProvider;
