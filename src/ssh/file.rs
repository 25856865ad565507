//! ssh::file
//!
//! OpenSSH client config reader.
//!
//! # Supported Syntax
//!
//! - `Host` lines with several patterns, `*` and `?` wildcards, `!` negation
//! - `Key value` and `Key=value`, keys case-insensitive, `#` comments
//! - Options before the first `Host` apply to every host
//! - `Match` blocks are not evaluated; their options never apply
//!
//! The first value obtained for an option wins, and `%h` in `HostName`
//! expands to the host being looked up.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use glob_match::glob_match;
use log::warn;
use thiserror::Error;

use super::SshConfig;

/// Errors reading an SSH config file.
#[derive(Debug, Error)]
pub enum SshConfigError {
    /// The file exists but could not be read.
    #[error("failed to read ssh config '{path}': {source}")]
    ReadError { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
struct Block {
    /// `None` for options outside any `Host` (and for `Match` blocks).
    patterns: Option<Vec<String>>,
    applies: bool,
    options: Vec<(String, String)>,
}

impl Block {
    fn matches(&self, host: &str) -> bool {
        if !self.applies {
            return false;
        }
        let Some(patterns) = &self.patterns else {
            return true;
        };

        let host = host.to_ascii_lowercase();
        let mut matched = false;
        for pattern in patterns {
            if let Some(negated) = pattern.strip_prefix('!') {
                if glob_match(negated, &host) {
                    return false;
                }
            } else if glob_match(pattern, &host) {
                matched = true;
            }
        }
        matched
    }
}

/// Parsed SSH client configuration.
#[derive(Debug, Clone, Default)]
pub struct SshConfigFile {
    blocks: Vec<Block>,
}

impl SshConfigFile {
    /// Load `~/.ssh/config` followed by `/etc/ssh/ssh_config`.
    ///
    /// Missing files are skipped; unreadable ones are skipped with a warning.
    pub fn load() -> Self {
        let mut paths = Vec::new();
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".ssh/config"));
        }
        paths.push(PathBuf::from("/etc/ssh/ssh_config"));

        let mut config = Self::default();
        for path in paths {
            match Self::read(&path) {
                Ok(parsed) => config.blocks.extend(parsed.blocks),
                Err(SshConfigError::ReadError { source, .. })
                    if source.kind() == io::ErrorKind::NotFound => {}
                Err(err) => warn!("{}", err),
            }
        }
        config
    }

    /// Read and parse one file.
    pub fn read(path: &Path) -> Result<Self, SshConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| SshConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&contents))
    }

    /// Parse config text.
    pub fn parse(contents: &str) -> Self {
        let mut blocks = vec![Block {
            patterns: None,
            applies: true,
            options: Vec::new(),
        }];

        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = split_option(line) else {
                continue;
            };

            match key.as_str() {
                "host" => blocks.push(Block {
                    patterns: Some(
                        value
                            .split_whitespace()
                            .map(|p| unquote(p).to_ascii_lowercase())
                            .collect(),
                    ),
                    applies: true,
                    options: Vec::new(),
                }),
                "match" => blocks.push(Block {
                    patterns: None,
                    applies: false,
                    options: Vec::new(),
                }),
                _ => {
                    if let Some(block) = blocks.last_mut() {
                        block.options.push((key, unquote(value).to_string()));
                    }
                }
            }
        }

        Self { blocks }
    }
}

impl SshConfig for SshConfigFile {
    fn get_value(&self, host: &str, key: &str) -> Option<String> {
        let key = key.to_ascii_lowercase();
        let value = self
            .blocks
            .iter()
            .filter(|block| block.matches(host))
            .flat_map(|block| block.options.iter())
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.clone())?;

        if key == "hostname" {
            Some(value.replace("%h", host))
        } else {
            Some(value)
        }
    }
}

/// Split `Key value` / `Key=value` into a lowercased key and the raw value.
fn split_option(line: &str) -> Option<(String, &str)> {
    let end = line.find(|c: char| c.is_whitespace() || c == '=')?;
    let (key, rest) = line.split_at(end);
    let rest = rest.trim_start();
    let rest = rest.strip_prefix('=').unwrap_or(rest).trim();
    if key.is_empty() || rest.is_empty() {
        return None;
    }
    Some((key.to_ascii_lowercase(), rest))
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}
