//! context
//!
//! Lazily resolved facts about the repository a command runs in.
//!
//! # Architecture
//!
//! A [`Context`] is built once per run, rooted at the working directory. It
//! holds the plumbing executor, the SSH configuration and the resolved host
//! settings, and hands out a [`LocalRepo`] once the directory is known to be
//! a repository. Everything below is computed on first use and memoized:
//!
//! ```text
//! Context ── is_repo ── LocalRepo ── remotes ── Remote ── urls ── Project
//!                                 ├─ current_branch ── Branch ── upstream
//!                                 └─ known_hosts
//! ```
//!
//! # Invariants
//!
//! - Memoized values are never invalidated; a new run needs a new `Context`
//! - Single-threaded: caches use `OnceCell`/`RefCell`, handles use `Rc`
//! - A remote named `origin` is always first in [`LocalRepo::remotes`]
//! - Absence (no branch, no project, unknown host) is `None`, never an error
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use hubcap::context::Context;
//! use hubcap::core::settings::HostSettings;
//! use hubcap::git::MockGit;
//! use hubcap::ssh::StaticSshConfig;
//!
//! let git = MockGit::new()
//!     .with("rev-parse -q --git-dir", ".git")
//!     .with("remote", "origin")
//!     .with("remote -v", "origin\tgit@github.com:alice/repo.git (fetch)");
//! let ctx = Context::new(
//!     "/work/repo",
//!     Rc::new(git),
//!     Rc::new(StaticSshConfig::new()),
//!     HostSettings::default(),
//! );
//!
//! let repo = ctx.local_repo().unwrap();
//! let project = repo.main_project().unwrap();
//! assert_eq!(project.name_with_owner(), "alice/repo");
//! ```

mod branch;
mod remote;

pub use branch::Branch;
pub use remote::Remote;

use std::cell::OnceCell;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use log::debug;
use thiserror::Error;

use crate::core::settings::{HostSettings, Settings};
use crate::forge::{GitUrlOptions, Project, ResolvedUrl};
use crate::git::{GitReader, Plumbing};
use crate::ssh::{SshConfig, SshConfigFile};

/// Ref used when no default branch can be determined.
pub const DEFAULT_MASTER_REF: &str = "refs/heads/master";

/// Errors from repository lookups.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContextError {
    /// The working directory is outside any repository.
    #[error("not a git repository")]
    NotARepo,

    /// A branch ref outside `refs/remotes/` was asked for its remote.
    #[error("can't get remote name from '{name}'")]
    NotRemoteBranch { name: String },

    /// No project owner was given and `github.user` is unset.
    #[error("no project owner given and github.user is not set")]
    NoOwner,
}

/// Per-run root of the repository model.
pub struct Context {
    dir: PathBuf,
    git: Rc<dyn Plumbing>,
    ssh: Rc<dyn SshConfig>,
    hosts: HostSettings,
    prefer_https: bool,
    is_repo: OnceCell<bool>,
    local_repo: OnceCell<LocalRepo>,
}

impl Context {
    /// Build a context from explicit collaborators.
    pub fn new(
        dir: impl Into<PathBuf>,
        git: Rc<dyn Plumbing>,
        ssh: Rc<dyn SshConfig>,
        hosts: HostSettings,
    ) -> Self {
        Self {
            dir: dir.into(),
            git,
            ssh,
            hosts,
            prefer_https: false,
            is_repo: OnceCell::new(),
            local_repo: OnceCell::new(),
        }
    }

    /// Build a context for `dir` backed by the real git executable and the
    /// user's SSH configuration.
    pub fn for_dir(dir: impl Into<PathBuf>, settings: &Settings) -> Self {
        let dir = dir.into();
        let git = GitReader::new(settings.executable.clone()).in_dir(dir.clone());
        let mut ctx = Self::new(
            dir,
            Rc::new(git),
            Rc::new(SshConfigFile::load()),
            settings.hosts.clone(),
        );
        ctx.prefer_https = settings.prefer_https;
        ctx
    }

    /// Treat HTTPS as the preferred protocol regardless of git config.
    pub fn with_https_preferred(mut self, prefer: bool) -> Self {
        self.prefer_https = prefer;
        self
    }

    /// The directory the run is rooted at.
    pub fn current_dir(&self) -> &Path {
        &self.dir
    }

    /// The host settings in effect.
    pub fn hosts(&self) -> &HostSettings {
        &self.hosts
    }

    /// The plumbing executor.
    pub fn git(&self) -> &dyn Plumbing {
        self.git.as_ref()
    }

    // ===== Repository detection =====

    /// Path of the git directory, if inside a repository.
    pub fn git_dir(&self) -> Option<String> {
        self.git.command("rev-parse -q --git-dir")
    }

    /// Whether the working directory is inside a repository.
    pub fn is_repo(&self) -> bool {
        *self.is_repo.get_or_init(|| {
            let found = self.git_dir().is_some();
            debug!("repository at {}: {}", self.dir.display(), found);
            found
        })
    }

    /// The local repository, or `NotARepo`.
    pub fn local_repo(&self) -> Result<&LocalRepo, ContextError> {
        self.try_local_repo().ok_or(ContextError::NotARepo)
    }

    /// The local repository, or `None` outside of one.
    pub fn try_local_repo(&self) -> Option<&LocalRepo> {
        if let Some(repo) = self.local_repo.get() {
            return Some(repo);
        }
        if !self.is_repo() {
            return None;
        }
        Some(self.local_repo.get_or_init(|| {
            LocalRepo::new(
                self.dir.clone(),
                Rc::clone(&self.git),
                Rc::clone(&self.ssh),
                self.hosts.clone(),
            )
        }))
    }

    // ===== Repository facts =====

    /// The default branch. Works outside a repository.
    pub fn master_branch(&self) -> Branch {
        match self.try_local_repo() {
            Some(repo) => repo.master_branch(),
            None => Branch::new(None, DEFAULT_MASTER_REF),
        }
    }

    /// The checked-out branch, `None` when detached.
    pub fn current_branch(&self) -> Result<Option<Branch>, ContextError> {
        Ok(self.local_repo()?.current_branch())
    }

    /// Project of the current branch's upstream, else of origin.
    pub fn current_project(&self) -> Result<Option<Project>, ContextError> {
        Ok(self.local_repo()?.current_project())
    }

    /// Project of the current branch's upstream remote.
    pub fn upstream_project(&self) -> Result<Option<Project>, ContextError> {
        Ok(self.local_repo()?.upstream_project())
    }

    /// Remotes, origin first.
    pub fn remotes(&self) -> Result<&[Remote], ContextError> {
        Ok(self.local_repo()?.remotes())
    }

    /// The first remote.
    pub fn origin_remote(&self) -> Result<Option<&Remote>, ContextError> {
        Ok(self.local_repo()?.origin_remote())
    }

    /// A configured group of remotes (`remotes.<name>`).
    pub fn remotes_group(&self, name: &str) -> Result<Option<String>, ContextError> {
        Ok(self.local_repo()?.remotes_group(name))
    }

    /// Name of the repository.
    pub fn repo_name(&self) -> Result<String, ContextError> {
        Ok(self.local_repo()?.name())
    }

    /// Owner of the main project.
    pub fn repo_owner(&self) -> Result<Option<String>, ContextError> {
        Ok(self.local_repo()?.repo_owner())
    }

    /// Host of the main project.
    pub fn repo_host(&self) -> Result<Option<String>, ContextError> {
        Ok(self.local_repo()?.repo_host())
    }

    /// Recognize an `http(s)` URL pointing into a hosted project.
    pub fn resolve_url(&self, url: &str) -> Result<Option<ResolvedUrl>, ContextError> {
        if !(url.starts_with("http:") || url.starts_with("https:")) {
            return Ok(None);
        }
        Ok(ResolvedUrl::resolve(url, self.local_repo()?))
    }

    /// A project named on the command line.
    ///
    /// `owner/name` in either argument is split. A missing name is the
    /// repository's name and a missing owner is `github.user`. Inside a
    /// repository with a main project the result keeps that project's host.
    pub fn github_project(
        &self,
        name: Option<&str>,
        owner: Option<&str>,
    ) -> Result<Project, ContextError> {
        let split = owner
            .filter(|o| o.contains('/'))
            .or_else(|| name.filter(|n| n.contains('/')))
            .and_then(|path| path.split_once('/'));

        let (owner, name) = match split {
            Some((owner, name)) => (owner.to_string(), name.to_string()),
            None => {
                let name = match name {
                    Some(name) => name.to_string(),
                    None => self.repo_name()?,
                };
                let owner = match owner {
                    Some(owner) => owner.to_string(),
                    None => self.git.config("github.user").ok_or(ContextError::NoOwner)?,
                };
                (owner, name)
            }
        };

        let repo = self.try_local_repo();
        let project = match repo.and_then(LocalRepo::main_project) {
            Some(main) => Project::new(owner, name, Some(main.host()), &self.hosts),
            None => Project::new(owner, name, None, &self.hosts),
        };
        Ok(match repo {
            Some(repo) => project.with_repo(repo.clone()),
            None => project,
        })
    }

    /// Clone URL of a named project, using HTTPS when configured.
    pub fn git_url(
        &self,
        owner: Option<&str>,
        name: Option<&str>,
        options: GitUrlOptions,
    ) -> Result<String, ContextError> {
        let project = self.github_project(name, owner)?;
        Ok(project.git_url(GitUrlOptions {
            https: options.https || self.https_protocol(),
            ..options
        }))
    }

    // ===== Configuration =====

    /// Whether clone URLs should use HTTPS.
    pub fn https_protocol(&self) -> bool {
        self.prefer_https
            || self.git.config("hub.protocol").as_deref() == Some("https")
            || self.git.config("--bool hub.http-clone").as_deref() == Some("true")
    }

    /// The expansion of a git alias.
    pub fn git_alias_for(&self, name: &str) -> Option<String> {
        self.git.config(&format!("alias.{}", name))
    }

    /// The user's editor as an argument vector, from `git var GIT_EDITOR`.
    ///
    /// A bare `$NAME` is read from the environment. Unquoted values that
    /// look like paths are expanded against the home or current directory.
    /// An existing file is kept as one word; anything else is shell-split.
    pub fn git_editor(&self) -> Option<Vec<String>> {
        let mut editor = self.git.command("var GIT_EDITOR")?;

        let variable = editor
            .strip_prefix('$')
            .filter(|v| !v.is_empty() && v.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
            .map(str::to_string);
        if let Some(variable) = variable {
            editor = std::env::var(&variable).ok()?;
        }

        let quoted = editor.contains('"') || editor.contains('\'');
        let path_like = editor.starts_with('~') || editor.starts_with('.') || editor.contains('/');
        if path_like && !quoted {
            editor = self.expand_path(&editor);
        }

        if self.dir.join(&editor).exists() {
            return Some(vec![editor]);
        }
        let words = shlex::split(&editor);
        debug!("editor '{}' split into {:?}", editor, words);
        words
    }

    fn expand_path(&self, path: &str) -> String {
        let expanded = match path.strip_prefix('~') {
            Some(rest) if rest.is_empty() || rest.starts_with('/') => match dirs::home_dir() {
                Some(home) => home.join(rest.trim_start_matches('/')),
                None => PathBuf::from(path),
            },
            Some(_) => PathBuf::from(path),
            None => self.dir.join(path.strip_prefix("./").unwrap_or(path)),
        };
        expanded.to_string_lossy().into_owned()
    }

    /// Commits on `b` not on `a`, ignoring cherry-picks and merges.
    pub fn rev_list(&self, a: &str, b: &str) -> Option<String> {
        self.git.command(&format!(
            "rev-list --cherry-pick --right-only --no-merges {}...{}",
            a, b
        ))
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("dir", &self.dir)
            .field("hosts", &self.hosts)
            .field("is_repo", &self.is_repo.get())
            .finish()
    }
}

// ===== LocalRepo =====

/// A git repository on disk.
///
/// Cheap to clone: clones share one set of memoized facts.
#[derive(Clone)]
pub struct LocalRepo {
    inner: Rc<RepoInner>,
}

struct RepoInner {
    dir: PathBuf,
    git: Rc<dyn Plumbing>,
    ssh: Rc<dyn SshConfig>,
    hosts: HostSettings,
    remotes: OnceCell<Vec<Remote>>,
    known_hosts: OnceCell<Vec<String>>,
}

impl LocalRepo {
    /// Wrap the repository at `dir`.
    pub fn new(
        dir: impl Into<PathBuf>,
        git: Rc<dyn Plumbing>,
        ssh: Rc<dyn SshConfig>,
        hosts: HostSettings,
    ) -> Self {
        Self {
            inner: Rc::new(RepoInner {
                dir: dir.into(),
                git,
                ssh,
                hosts,
                remotes: OnceCell::new(),
                known_hosts: OnceCell::new(),
            }),
        }
    }

    /// The repository directory.
    pub fn dir(&self) -> &Path {
        &self.inner.dir
    }

    /// The plumbing executor.
    pub fn git(&self) -> &dyn Plumbing {
        self.inner.git.as_ref()
    }

    /// SSH client configuration.
    pub fn ssh_config(&self) -> &dyn SshConfig {
        self.inner.ssh.as_ref()
    }

    /// Host settings.
    pub fn hosts(&self) -> &HostSettings {
        &self.inner.hosts
    }

    /// Host used when a project names none.
    pub fn default_host(&self) -> &str {
        &self.inner.hosts.default_host
    }

    /// The platform's main host.
    pub fn main_host(&self) -> &str {
        &self.inner.hosts.main_host
    }

    /// Main project name, else the directory name.
    pub fn name(&self) -> String {
        match self.main_project() {
            Some(project) => project.name().to_string(),
            None => self
                .dir()
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }

    /// Owner of the main project.
    pub fn repo_owner(&self) -> Option<String> {
        self.main_project().map(|p| p.owner().to_string())
    }

    /// Host of the main project.
    pub fn repo_host(&self) -> Option<String> {
        self.main_project().map(|p| p.host().to_string())
    }

    /// The project behind the origin remote.
    pub fn main_project(&self) -> Option<Project> {
        self.origin_remote()?.project(self)
    }

    /// The project behind the current branch's upstream, when that upstream
    /// is a remote-tracking ref.
    pub fn upstream_project(&self) -> Option<Project> {
        let upstream = self.current_branch()?.upstream()?;
        if !upstream.is_remote() {
            return None;
        }
        let remote_name = upstream.remote_name().ok()?;
        self.remote_by_name(remote_name)?.project(self)
    }

    /// Upstream project, else main project.
    pub fn current_project(&self) -> Option<Project> {
        self.upstream_project().or_else(|| self.main_project())
    }

    /// The branch HEAD points at, `None` when detached.
    pub fn current_branch(&self) -> Option<Branch> {
        self.git()
            .command("symbolic-ref -q HEAD")
            .map(|name| Branch::new(Some(self.clone()), name))
    }

    /// The default branch: what origin's HEAD points at, else `master`.
    pub fn master_branch(&self) -> Branch {
        let name = self.origin_remote().and_then(|remote| {
            self.git()
                .command(&format!("rev-parse --symbolic-full-name {}", remote.name()))
        });
        Branch::new(
            Some(self.clone()),
            name.unwrap_or_else(|| DEFAULT_MASTER_REF.to_string()),
        )
    }

    /// All remotes, with `origin` moved to the front.
    pub fn remotes(&self) -> &[Remote] {
        self.inner.remotes.get_or_init(|| {
            let mut names: Vec<String> = self
                .git()
                .command("remote")
                .map(|out| out.lines().map(String::from).collect())
                .unwrap_or_default();

            if let Some(pos) = names.iter().position(|name| name == "origin") {
                let origin = names.remove(pos);
                names.insert(0, origin);
            }

            debug!("remotes: {:?}", names);
            names.into_iter().map(Remote::new).collect()
        })
    }

    /// A configured group of remotes (`remotes.<name>`).
    pub fn remotes_group(&self, name: &str) -> Option<String> {
        self.git().config(&format!("remotes.{}", name))
    }

    /// The first remote.
    pub fn origin_remote(&self) -> Option<&Remote> {
        self.remotes().first()
    }

    /// Find a remote by name.
    pub fn remote_by_name(&self, name: &str) -> Option<&Remote> {
        self.remotes().iter().find(|remote| remote.name() == name)
    }

    /// Hosts whose URLs denote hosted projects: `hub.host` entries, hosts
    /// from the config file, the default host and its `ssh.` alias.
    pub fn known_hosts(&self) -> &[String] {
        self.inner.known_hosts.get_or_init(|| {
            let mut hosts = self.git().config_all("hub.host");
            hosts.extend(self.inner.hosts.extra_hosts.iter().cloned());
            hosts.push(self.inner.hosts.default_host.clone());
            hosts.push(self.inner.hosts.ssh_alias());
            hosts
        })
    }
}

impl fmt::Debug for LocalRepo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalRepo")
            .field("dir", &self.inner.dir)
            .finish()
    }
}
