//! ssh
//!
//! Queries against the SSH client configuration.
//!
//! # Overview
//!
//! Remote URLs often name a host alias (`Host work` in `~/.ssh/config`) rather
//! than the real server. Hubcap resolves such aliases through the
//! [`SshConfig`] trait:
//!
//! - [`SshConfigFile`] reads the user and system OpenSSH config files
//! - [`StaticSshConfig`] is an in-memory table (tests, or "no config")
//!
//! A lookup answers `None` when nothing is configured; callers supply their
//! own fallback with `unwrap_or_else`.

mod file;

pub use file::{SshConfigError, SshConfigFile};

use std::collections::HashMap;

/// Read-only view of SSH client configuration.
pub trait SshConfig {
    /// The value of option `key` (case-insensitive) for `host`.
    fn get_value(&self, host: &str, key: &str) -> Option<String>;
}

/// SSH configuration held in memory, keyed by exact host.
///
/// # Example
///
/// ```
/// use hubcap::ssh::{SshConfig, StaticSshConfig};
///
/// let config = StaticSshConfig::new().with("work", "HostName", "github.com");
/// assert_eq!(config.get_value("work", "hostname").as_deref(), Some("github.com"));
/// assert_eq!(config.get_value("home", "hostname"), None);
/// ```
#[derive(Debug, Default, Clone)]
pub struct StaticSshConfig {
    values: HashMap<(String, String), String>,
}

impl StaticSshConfig {
    /// An empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` for `host`.
    pub fn with(mut self, host: &str, key: &str, value: &str) -> Self {
        self.values.insert(
            (host.to_string(), key.to_ascii_lowercase()),
            value.to_string(),
        );
        self
    }
}

impl SshConfig for StaticSshConfig {
    fn get_value(&self, host: &str, key: &str) -> Option<String> {
        self.values
            .get(&(host.to_string(), key.to_ascii_lowercase()))
            .cloned()
    }
}
