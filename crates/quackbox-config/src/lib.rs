//! Configuration management for Quackbox
//!
//! Holds the three locations the catalog engine needs (games directory,
//! cover-art directory, catalog file) plus scan, watch and logging settings.
//! Files are TOML; environment variables prefixed with `QUACKBOX_` can
//! override any key when loading through [`QuackboxConfig::load_layered`].

mod sections;

pub use sections::{PathsConfig, ScanSettings, WatchConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Layered configuration error: {0}")]
    Layered(#[from] config::ConfigError),
}

/// Standard configuration paths
pub const CONFIG_DIR: &str = "/etc/quackbox";
pub const USER_CONFIG_SUBDIR: &str = ".config/quackbox";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Prefix for environment overrides, e.g. `QUACKBOX_PATHS__GAMES_DIR`
pub const ENV_PREFIX: &str = "QUACKBOX";

/// Main Quackbox configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuackboxConfig {
    /// Default tracing filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub scan: ScanSettings,

    #[serde(default)]
    pub watch: WatchConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for QuackboxConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            paths: PathsConfig::default(),
            scan: ScanSettings::default(),
            watch: WatchConfig::default(),
        }
    }
}

impl QuackboxConfig {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load an optional TOML file with `QUACKBOX_*` environment overrides on top
    ///
    /// Nested keys use a double underscore: `QUACKBOX_PATHS__CATALOG_FILE`.
    pub fn load_layered(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(
                config::File::from(path)
                    .format(config::FileFormat::Toml)
                    .required(true),
            );
        }

        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("scan.extensions")
                .try_parsing(true),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Locate the first existing config file in the default search order
    pub fn default_location() -> Option<PathBuf> {
        let user_config = std::env::var_os("HOME")
            .map(|home| PathBuf::from(home).join(USER_CONFIG_SUBDIR).join(CONFIG_FILE_NAME));
        if let Some(user_config) = user_config
            && user_config.exists()
        {
            return Some(user_config);
        }

        let system_config = Path::new(CONFIG_DIR).join(CONFIG_FILE_NAME);
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration from default locations
    pub fn load_default() -> Result<Self, ConfigError> {
        let location = Self::default_location();
        if location.is_none() {
            tracing::warn!("No configuration file found, using defaults");
        }
        Self::load_layered(location.as_deref())
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = self.to_toml()?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Render as pretty TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let paths = &self.paths;
        if paths.catalog_file.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("paths.catalog_file is empty".into()));
        }
        if paths.catalog_file.file_name().is_none() {
            return Err(ConfigError::Invalid(format!(
                "paths.catalog_file must name a file: {}",
                paths.catalog_file.display()
            )));
        }
        if paths.games_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("paths.games_dir is empty".into()));
        }
        Ok(())
    }
}
