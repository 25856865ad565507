//! context::branch
//!
//! A named ref, with helpers to reason about its short name and upstream.

use std::fmt;

use super::{ContextError, LocalRepo};

const REMOTES_PREFIX: &str = "refs/remotes/";

/// A branch, identified by its full ref name.
#[derive(Clone)]
pub struct Branch {
    repo: Option<LocalRepo>,
    name: String,
}

impl Branch {
    /// A branch called `name`, optionally bound to a repository.
    pub fn new(repo: Option<LocalRepo>, name: impl Into<String>) -> Self {
        Self {
            repo,
            name: name.into(),
        }
    }

    /// The full ref name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The name without `refs/<kind>/` or `refs/remotes/<remote>/`.
    ///
    /// ```
    /// use hubcap::context::Branch;
    ///
    /// assert_eq!(Branch::new(None, "refs/heads/feature/x").short_name(), "feature/x");
    /// assert_eq!(Branch::new(None, "refs/remotes/origin/main").short_name(), "main");
    /// assert_eq!(Branch::new(None, "main").short_name(), "main");
    /// ```
    pub fn short_name(&self) -> &str {
        let Some(rest) = self.name.strip_prefix("refs/") else {
            return &self.name;
        };
        if let Some(short) = rest.strip_prefix("remotes/").and_then(skip_segment) {
            return short;
        }
        skip_segment(rest).unwrap_or(&self.name)
    }

    /// Whether this is the repository's default branch (by short name).
    pub fn is_master(&self) -> bool {
        match &self.repo {
            Some(repo) => self.short_name() == repo.master_branch().short_name(),
            None => self.short_name() == "master",
        }
    }

    /// The branch this one tracks.
    pub fn upstream(&self) -> Option<Branch> {
        let repo = self.repo.as_ref()?;
        repo.git()
            .command(&format!(
                "rev-parse --symbolic-full-name {}@{{upstream}}",
                self.short_name()
            ))
            .map(|name| Branch::new(Some(repo.clone()), name))
    }

    /// Whether this is a remote-tracking ref.
    pub fn is_remote(&self) -> bool {
        self.name.starts_with(REMOTES_PREFIX)
    }

    /// The remote of a remote-tracking ref.
    ///
    /// # Errors
    ///
    /// `NotRemoteBranch` for anything not under `refs/remotes/<name>`.
    pub fn remote_name(&self) -> Result<&str, ContextError> {
        self.name
            .strip_prefix(REMOTES_PREFIX)
            .and_then(|rest| rest.split('/').next())
            .filter(|remote| !remote.is_empty())
            .ok_or_else(|| ContextError::NotRemoteBranch {
                name: self.name.clone(),
            })
    }
}

/// Drop the leading `<segment>/`, where the segment is at least one char.
fn skip_segment(s: &str) -> Option<&str> {
    let first = s.chars().next()?.len_utf8();
    let slash = s[first..].find('/')? + first;
    Some(&s[slash + 1..])
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Branch {}

impl fmt::Debug for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Branch").field(&self.name).finish()
    }
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
