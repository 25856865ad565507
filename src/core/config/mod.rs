//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Hubcap has a single, optional, user-level config file. Repository-level
//! settings live in git config (`hub.host`, `hub.protocol`) and are read
//! through the plumbing executor instead.
//!
//! # Locations
//!
//! Searched in order, first existing file wins:
//! 1. `$HUBCAP_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/hubcap/config.toml`
//! 3. `~/.hubcap/config.toml`
//!
//! # Example
//!
//! ```no_run
//! use hubcap::core::config::Config;
//!
//! let result = Config::load().unwrap();
//! let config = result.config;
//!
//! if let Some(host) = config.host() {
//!     println!("Default host: {}", host);
//! }
//! println!("Known hosts: {:?}", config.extra_hosts());
//! ```

pub mod schema;

pub use schema::GlobalConfig;

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "HUBCAP_CONFIG";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The file is not valid TOML for the schema.
    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    /// A value parsed but failed validation.
    #[error("invalid config value: {0}")]
    InvalidValue(String),

    /// The default location needs a home directory and none was found.
    #[error("home directory not found")]
    NoHomeDir,
}

/// Warnings generated during config loading.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    /// The warning message.
    pub message: String,
    /// The path that triggered the warning.
    pub path: PathBuf,
}

/// Result of loading configuration.
#[derive(Debug)]
pub struct ConfigLoadResult {
    /// The loaded configuration.
    pub config: Config,
    /// Any warnings generated during loading.
    pub warnings: Vec<ConfigWarning>,
}

/// Loaded configuration with defaulting accessors.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Path the configuration was loaded from (if any)
    path: Option<PathBuf>,
}

impl Config {
    /// Wrap an already-built global config (not tied to a file).
    pub fn new(global: GlobalConfig) -> Self {
        Self { global, path: None }
    }

    /// Load configuration from the default locations.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file exists but cannot be read, parsed,
    /// or validated. A missing file is not an error.
    pub fn load() -> Result<ConfigLoadResult, ConfigError> {
        let mut warnings = Vec::new();
        let mut candidates = Vec::new();

        // 1. Check $HUBCAP_CONFIG
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            let path = PathBuf::from(path);
            if !path.exists() {
                warnings.push(ConfigWarning {
                    message: format!("{} points to a missing file, ignoring it", CONFIG_ENV),
                    path: path.clone(),
                });
            }
            candidates.push(path);
        }

        // 2. Check $XDG_CONFIG_HOME/hubcap/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            candidates.push(PathBuf::from(xdg_home).join("hubcap/config.toml"));
        }

        // 3. Check ~/.hubcap/config.toml
        if let Ok(path) = Self::global_config_path() {
            candidates.push(path);
        }

        for path in candidates {
            if path.exists() {
                let config = Self::read(&path)?;
                return Ok(ConfigLoadResult { config, warnings });
            }
        }

        Ok(ConfigLoadResult {
            config: Config::default(),
            warnings,
        })
    }

    /// Read, parse and validate one config file.
    pub fn read(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        let global: GlobalConfig =
            toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        global.validate()?;

        Ok(Config {
            global,
            path: Some(path.to_path_buf()),
        })
    }

    /// Get the canonical path for the config file.
    ///
    /// Returns `~/.hubcap/config.toml`.
    pub fn global_config_path() -> Result<PathBuf, ConfigError> {
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".hubcap/config.toml"))
    }

    // =========================================================================
    // Accessor methods
    // =========================================================================

    /// Configured git executable, if any.
    pub fn git(&self) -> Option<&str> {
        self.global.git.as_deref()
    }

    /// Configured default host, if any.
    pub fn host(&self) -> Option<&str> {
        self.global.host.as_deref()
    }

    /// Extra known hosts. Empty when not configured.
    pub fn extra_hosts(&self) -> &[String] {
        self.global.hosts.as_deref().unwrap_or(&[])
    }

    /// Whether HTTPS is the configured protocol.
    ///
    /// Defaults to `false` if not configured.
    pub fn prefers_https(&self) -> bool {
        self.global.protocol.as_deref() == Some("https")
    }

    /// Get the path the config was loaded from.
    pub fn loaded_from(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}
