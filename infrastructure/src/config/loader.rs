//! Configuration loader with multi-source merging
//!
//! Sources merge in priority order (highest last): defaults, a project
//! `agora.toml` (or `.agora.toml`), an explicit `--config` path, and
//! finally `AGORA_`-prefixed environment variables. The merged engine
//! section is validated before it is handed to anything else.

use super::file_config::FileConfig;
use agora_domain::ConfigValidationError;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading or validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Read(#[from] Box<figment::Error>),

    #[error("invalid configuration: {0}")]
    Invalid(#[from] ConfigValidationError),
}

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load and validate configuration from all sources
    pub fn load(config_path: Option<&PathBuf>) -> Result<FileConfig, ConfigError> {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        for filename in &["agora.toml", ".agora.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                figment = figment.merge(Toml::file(&path));
                break;
            }
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // AGORA_ENGINE__VOTE_INCREMENT_PCT=25 etc. override everything.
        figment = figment.merge(Env::prefixed("AGORA_").split("__").lowercase(true));

        let config: FileConfig = figment.extract().map_err(Box::new)?;
        config.engine.validate()?;
        Ok(config)
    }

    /// Defaults only, for `--no-config` and tests
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// The project-level config file path, if one exists
    pub fn project_config_path() -> Option<PathBuf> {
        for filename in &["agora.toml", ".agora.toml"] {
            let path = PathBuf::from(filename);
            if path.exists() {
                return Some(path);
            }
        }
        None
    }
}
