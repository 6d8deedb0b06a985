//! Configuration access port

use agora_domain::EngineConfig;

/// Read access to the engine tunables
///
/// Each tick takes one snapshot up front and uses it for the whole unit of
/// work, so a config reload never straddles a transition.
pub trait ConfigProvider: Send + Sync {
    fn snapshot(&self) -> EngineConfig;
}

/// Fixed config, mainly for tests and the demo driver
pub struct StaticConfig(pub EngineConfig);

impl ConfigProvider for StaticConfig {
    fn snapshot(&self) -> EngineConfig {
        self.0.clone()
    }
}
