//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (in order of precedence):
//! 1. `$HUBCAP_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/hubcap/config.toml`
//! 3. `~/.hubcap/config.toml`
//!
//! # Validation
//!
//! Config values are validated after parsing: strings that name an
//! executable or a host must be non-empty, and `protocol` must be known.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// git = "/usr/local/bin/git"
/// host = "github.example.com"
/// hosts = ["git.corp.example.com"]
/// protocol = "https"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// Git executable to wrap
    pub git: Option<String>,

    /// Default hosted-service host
    pub host: Option<String>,

    /// Additional hosts whose remotes count as hosted projects
    pub hosts: Option<Vec<String>>,

    /// Preferred clone protocol ("https", "ssh" or "git")
    pub protocol: Option<String>,
}

impl GlobalConfig {
    /// Valid protocol names.
    pub const VALID_PROTOCOLS: &'static [&'static str] = &["https", "ssh", "git"];

    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(git) = &self.git {
            if git.trim().is_empty() {
                return Err(ConfigError::InvalidValue("git cannot be empty".to_string()));
            }
        }

        if let Some(host) = &self.host {
            if host.trim().is_empty() {
                return Err(ConfigError::InvalidValue("host cannot be empty".to_string()));
            }
        }

        if let Some(hosts) = &self.hosts {
            if hosts.iter().any(|h| h.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(
                    "hosts cannot contain empty entries".to_string(),
                ));
            }
        }

        if let Some(protocol) = &self.protocol {
            if !Self::VALID_PROTOCOLS.contains(&protocol.as_str()) {
                return Err(ConfigError::InvalidValue(format!(
                    "invalid protocol '{}', must be one of: {}",
                    protocol,
                    Self::VALID_PROTOCOLS.join(", ")
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = GlobalConfig::default();
        assert!(config.git.is_none());
        assert!(config.host.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn valid_protocol() {
        let config = GlobalConfig {
            protocol: Some("https".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_protocol() {
        let config = GlobalConfig {
            protocol: Some("ftp".to_string()),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn empty_values_rejected() {
        let config = GlobalConfig {
            git: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = GlobalConfig {
            hosts: Some(vec!["ok.example.com".to_string(), "".to_string()]),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn roundtrip() {
        let config = GlobalConfig {
            git: Some("/opt/git/bin/git".to_string()),
            host: Some("github.example.com".to_string()),
            hosts: Some(vec!["git.corp.example.com".to_string()]),
            protocol: Some("ssh".to_string()),
        };

        let toml = toml::to_string_pretty(&config).unwrap();
        let parsed: GlobalConfig = toml::from_str(&toml).unwrap();
        assert_eq!(config, parsed);
    }

    #[test]
    fn reject_unknown_fields() {
        let toml = r#"
            host = "github.com"
            unknown_field = true
        "#;

        let result: Result<GlobalConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }
}
