//! git
//!
//! Plumbing access to the underlying git binary.
//!
//! # Architecture
//!
//! Repository facts are read by running low-level git commands and consuming
//! their output. Everything that does so goes through the [`Plumbing`] trait:
//!
//! - [`GitReader`] runs the real executable, caching output per command
//! - [`mock::MockGit`] answers from a table, for deterministic tests
//!
//! # Contract
//!
//! A plumbing call is synchronous and one-shot. It yields trimmed standard
//! output on success and `None` on a non-zero exit; callers treat `None` as
//! "no answer", never as an error.
//!
//! # Example
//!
//! ```no_run
//! use hubcap::git::{GitReader, Plumbing};
//!
//! let git = GitReader::new(vec!["git".to_string()]);
//! if let Some(dir) = git.command("rev-parse -q --git-dir") {
//!     println!("git dir: {}", dir);
//! }
//! let hosts = git.config_all("hub.host");
//! ```

pub mod mock;
mod reader;

pub use mock::MockGit;
pub use reader::GitReader;

/// A synchronous executor for git plumbing commands.
pub trait Plumbing {
    /// Run `git <cmd>` and return its trimmed stdout, or `None` on failure.
    ///
    /// `cmd` is split into words with shell quoting rules.
    fn command(&self, cmd: &str) -> Option<String>;

    /// Read a single config value (`git config <key>`).
    fn config(&self, key: &str) -> Option<String> {
        self.command(&format!("config {}", key))
    }

    /// Read every value of a multi-valued config key.
    fn config_all(&self, key: &str) -> Vec<String> {
        self.command(&format!("config --get-all {}", key))
            .map(|out| out.lines().map(String::from).collect())
            .unwrap_or_default()
    }
}
