//! `ConfigProvider` adapter over loaded configuration

use agora_application::ports::config::ConfigProvider;
use agora_domain::{ConfigValidationError, EngineConfig};
use std::sync::RwLock;

/// Shared engine config with reload support
///
/// Snapshots are cheap clones; a reload swaps the whole value, so a tick
/// that already took its snapshot keeps working with the old tunables.
pub struct SharedConfigProvider {
    current: RwLock<EngineConfig>,
}

impl SharedConfigProvider {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            current: RwLock::new(config),
        }
    }

    /// Replace the config; rejected if the new value fails validation
    pub fn update(&self, config: EngineConfig) -> Result<(), ConfigValidationError> {
        config.validate()?;
        if let Ok(mut current) = self.current.write() {
            *current = config;
        }
        Ok(())
    }
}

impl ConfigProvider for SharedConfigProvider {
    fn snapshot(&self) -> EngineConfig {
        self.current
            .read()
            .map(|config| config.clone())
            .unwrap_or_default()
    }
}
