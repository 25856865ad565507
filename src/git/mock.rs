//! git::mock
//!
//! Table-driven plumbing executor for deterministic testing.
//!
//! # Example
//!
//! ```
//! use hubcap::git::{MockGit, Plumbing};
//!
//! let git = MockGit::new()
//!     .with("remote", "upstream\norigin")
//!     .with("config --get-all hub.host", "git.example.com");
//!
//! assert_eq!(git.command("remote").as_deref(), Some("upstream\norigin"));
//! assert_eq!(git.config_all("hub.host"), vec!["git.example.com"]);
//! assert_eq!(git.command("symbolic-ref -q HEAD"), None);
//! assert_eq!(git.count("remote"), 1);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;

use super::Plumbing;

/// Mock plumbing executor.
///
/// Commands without a canned response behave like a failing git command.
#[derive(Debug, Default)]
pub struct MockGit {
    responses: HashMap<String, String>,
    issued: RefCell<Vec<String>>,
}

impl MockGit {
    /// Create a mock with no responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `cmd` with `output`.
    pub fn with(mut self, cmd: &str, output: &str) -> Self {
        self.responses.insert(cmd.to_string(), output.to_string());
        self
    }

    /// Every command issued so far, in order.
    pub fn issued(&self) -> Vec<String> {
        self.issued.borrow().clone()
    }

    /// How many times `cmd` was issued.
    pub fn count(&self, cmd: &str) -> usize {
        self.issued.borrow().iter().filter(|c| *c == cmd).count()
    }
}

impl Plumbing for MockGit {
    fn command(&self, cmd: &str) -> Option<String> {
        self.issued.borrow_mut().push(cmd.to_string());
        self.responses.get(cmd).map(|out| out.trim().to_string())
    }
}
