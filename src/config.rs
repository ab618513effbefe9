//! Interpreter configuration
//!
//! Sources, lowest precedence first:
//!
//! 1. Built-in defaults
//! 2. `conduit.toml` in the working directory, or the file named by
//!    `CONDUIT_CONFIG_PATH` (`--config` on the command line)
//! 3. `CONDUIT_*` environment variables, e.g. `CONDUIT_LOG_LEVEL=debug` or
//!    `CONDUIT_DEBUG__TARGETS=CarsExtractor,CarsLoader`
//!
//! A `.env` file is loaded into the environment first.

use std::path::PathBuf;

use config::{Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

use crate::execution::{DebugConfig, DebugGranularity, DebugTargets};

pub const CONFIG_PATH_ENV: &str = "CONDUIT_CONFIG_PATH";
const DEFAULT_CONFIG_FILE: &str = "conduit.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    /// Default `tracing` filter when `RUST_LOG` is not set
    pub log_level: String,
    pub debug: DebugSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DebugSettings {
    pub enabled: bool,
    pub granularity: DebugGranularity,
    /// Blocks to debug; empty means all
    pub targets: Vec<String>,
}

impl Config {
    /// Load from the default sources
    pub fn load() -> Result<Self, ConfigError> {
        Self::builder().build()
    }

    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    pub fn to_debug_config(&self) -> DebugConfig {
        DebugConfig {
            enabled: self.debug.enabled,
            granularity: self.debug.granularity,
            targets: DebugTargets::from_names(self.debug.targets.iter().cloned()),
        }
    }
}

/// Explicit overrides applied on top of every other source
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    config_path: Option<PathBuf>,
    log_level: Option<String>,
}

impl ConfigBuilder {
    pub fn config_path(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    pub fn log_level(mut self, level: Option<String>) -> Self {
        self.log_level = level;
        self
    }

    pub fn build(self) -> Result<Config, ConfigError> {
        dotenvy::dotenv().ok();

        let explicit = self
            .config_path
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from));

        let mut builder = config::Config::builder()
            .set_default("log_level", "info")?
            .set_default("debug.enabled", false)?
            .set_default("debug.granularity", "minimal")?
            .set_default("debug.targets", Vec::<String>::new())?;

        builder = match explicit {
            // A file that was asked for by name has to exist
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path));
                }
                builder.add_source(File::from(path).format(FileFormat::Toml))
            }
            None => builder.add_source(
                File::with_name(DEFAULT_CONFIG_FILE)
                    .format(FileFormat::Toml)
                    .required(false),
            ),
        };

        builder = builder.add_source(
            Environment::with_prefix("CONDUIT")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("debug.targets"),
        );

        if let Some(level) = self.log_level {
            builder = builder.set_override("log_level", level)?;
        }

        let config: Config = builder.build()?.try_deserialize()?;
        tracing::debug!(?config, "loaded configuration");
        Ok(config)
    }
}
