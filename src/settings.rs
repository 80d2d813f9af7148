//! Settings loading: optional TOML file with an `ENVWRAP__*` environment overlay.

use crate::logging::LoggingConfig;
use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tool settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings loader.
pub struct SettingsLoader;

impl SettingsLoader {
    /// Load settings.
    /// Precedence: defaults (lowest) -> file -> environment (highest).
    pub fn load(file: Option<&Path>) -> Result<Settings, ConfigError> {
        Self::load_with(file, Self::environment())
    }

    /// Environment overlay: ENVWRAP prefix, `__` as separator for nested keys.
    pub fn environment() -> Environment {
        Environment::with_prefix("ENVWRAP")
            .separator("__")
            .try_parsing(true)
    }

    pub(crate) fn load_with(
        file: Option<&Path>,
        environment: Environment,
    ) -> Result<Settings, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }
        let builder = builder.add_source(environment);

        let config = builder.build()?;
        config.try_deserialize()
    }
}
