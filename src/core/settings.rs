//! core::settings
//!
//! Run-wide settings, resolved once at startup.
//!
//! # Precedence
//!
//! Environment beats the config file, which beats the built-in default:
//!
//! | Setting | Environment | Config key | Default |
//! |---|---|---|---|
//! | executable | `$GIT` | `git` | `git` |
//! | default host | `$GITHUB_HOST` | `host` | `github.com` |
//!
//! Nothing downstream re-reads the environment; everything that needs a
//! host or the executable receives these values.

use crate::core::config::Config;
use crate::engine::args::{DEFAULT_EXECUTABLE, EXECUTABLE_ENV};

/// Environment variable overriding the default host.
pub const HOST_ENV: &str = "GITHUB_HOST";

/// The platform's main host. Projects elsewhere are assumed private.
pub const MAIN_HOST: &str = "github.com";

/// Host-related settings consumed by the repository model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostSettings {
    /// Host used when none is known
    pub default_host: String,
    /// The public main host
    pub main_host: String,
    /// Hosts from the config file that also denote hosted projects
    pub extra_hosts: Vec<String>,
}

impl HostSettings {
    /// Settings for a given default host.
    pub fn new(default_host: impl Into<String>) -> Self {
        Self {
            default_host: default_host.into(),
            main_host: MAIN_HOST.to_string(),
            extra_hosts: Vec::new(),
        }
    }

    /// The `ssh.`-prefixed alias of the default host (SSH over the HTTPS port).
    pub fn ssh_alias(&self) -> String {
        format!("ssh.{}", self.default_host)
    }
}

impl Default for HostSettings {
    fn default() -> Self {
        Self::new(MAIN_HOST)
    }
}

/// Settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// The wrapped executable
    pub executable: Vec<String>,
    /// Host settings
    pub hosts: HostSettings,
    /// Config file asks for HTTPS URLs
    pub prefer_https: bool,
}

impl Settings {
    /// Resolve against the process environment.
    pub fn resolve(config: &Config) -> Self {
        Self::resolve_with(config, |key| std::env::var(key).ok())
    }

    /// Resolve with an explicit environment lookup.
    pub fn resolve_with<F>(config: &Config, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let nonempty = |value: Option<String>| value.filter(|v| !v.trim().is_empty());

        let executable = nonempty(env(EXECUTABLE_ENV))
            .or_else(|| config.git().map(String::from))
            .unwrap_or_else(|| DEFAULT_EXECUTABLE.to_string());

        let default_host = nonempty(env(HOST_ENV))
            .or_else(|| config.host().map(String::from))
            .unwrap_or_else(|| MAIN_HOST.to_string());

        Self {
            executable: vec![executable],
            hosts: HostSettings {
                default_host,
                main_host: MAIN_HOST.to_string(),
                extra_hosts: config.extra_hosts().to_vec(),
            },
            prefer_https: config.prefers_https(),
        }
    }
}
