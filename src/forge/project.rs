//! forge::project
//!
//! Identity of a hosted project and the URLs derived from it.
//!
//! # Identity
//!
//! Two projects are equal when their `owner/name` strings are equal. Host,
//! repository back-reference and metadata do not take part in comparison.
//!
//! # Normalization
//!
//! - spaces in the name become dashes
//! - a missing host becomes the default host
//! - `ssh.<default host>` (SSH over the HTTPS port) becomes the default host

use std::fmt;

use percent_encoding::percent_decode_str;
use reqwest::Url;

use crate::context::{LocalRepo, Remote};
use crate::core::settings::HostSettings;

/// Options for [`Project::git_url`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GitUrlOptions {
    /// Force `https://host/owner/name.git`
    pub https: bool,
    /// Force `git@host:owner/name.git`
    pub private: bool,
}

/// A project on a hosted git service.
#[derive(Clone)]
pub struct Project {
    owner: String,
    name: String,
    host: String,
    main_host: String,
    repo: Option<LocalRepo>,
    repo_data: Option<serde_json::Value>,
}

impl Project {
    /// Create a project, normalizing its name and host.
    ///
    /// # Example
    ///
    /// ```
    /// use hubcap::core::settings::HostSettings;
    /// use hubcap::forge::Project;
    ///
    /// let hosts = HostSettings::default();
    /// let project = Project::new("alice", "my repo", Some("ssh.github.com"), &hosts);
    /// assert_eq!(project.name(), "my-repo");
    /// assert_eq!(project.host(), "github.com");
    ///
    /// let project = Project::new("alice", "repo", None, &hosts);
    /// assert_eq!(project.host(), "github.com");
    /// ```
    pub fn new(
        owner: impl Into<String>,
        name: impl Into<String>,
        host: Option<&str>,
        hosts: &HostSettings,
    ) -> Self {
        let name = name.into().replace(' ', "-");
        let mut host = host.unwrap_or(&hosts.default_host).to_string();
        if host.eq_ignore_ascii_case(&hosts.ssh_alias()) {
            host = host["ssh.".len()..].to_string();
        }

        Self {
            owner: owner.into(),
            name,
            host,
            main_host: hosts.main_host.clone(),
            repo: None,
            repo_data: None,
        }
    }

    /// Recognize a hosted project from a parsed remote URL.
    ///
    /// Returns `None` unless the URL's host is one of the repository's known
    /// hosts and its path has an owner and a name.
    pub fn from_url(url: &Url, repo: &LocalRepo) -> Option<Self> {
        let host = url.host_str()?;
        if !repo.known_hosts().iter().any(|known| known == host) {
            return None;
        }

        let mut segments = url.path().splitn(4, '/').skip(1);
        let owner = decode_segment(segments.next()?)?;
        let decoded = decode_segment(segments.next()?)?;
        let name = decoded.strip_suffix(".git").unwrap_or(decoded.as_ref());
        if owner.is_empty() || name.is_empty() {
            return None;
        }

        Some(Project::new(owner.as_ref(), name, Some(host), repo.hosts()).with_repo(repo.clone()))
    }

    /// Attach the repository this project was found in.
    pub fn with_repo(mut self, repo: LocalRepo) -> Self {
        self.repo = Some(repo);
        self
    }

    /// Attach repository metadata fetched from the hosted service.
    pub fn with_repo_data(mut self, data: serde_json::Value) -> Self {
        self.repo_data = Some(data);
        self
    }

    /// The owning user or organization.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// The project name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The host serving this project.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The repository this project was found in, if any.
    pub fn repo(&self) -> Option<&LocalRepo> {
        self.repo.as_ref()
    }

    /// Repository metadata, if any was attached.
    pub fn repo_data(&self) -> Option<&serde_json::Value> {
        self.repo_data.as_ref()
    }

    /// `owner/name`, the project's identity.
    pub fn name_with_owner(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// A copy of this project under a different owner (e.g. a fork).
    pub fn owned_by(&self, owner: impl Into<String>) -> Self {
        let mut project = self.clone();
        project.owner = owner.into();
        project
    }

    /// Whether the project is private.
    ///
    /// Uses the `private` field of attached metadata when present. Without
    /// metadata, anything not on the main host is assumed private.
    pub fn is_private(&self) -> bool {
        if let Some(private) = self
            .repo_data
            .as_ref()
            .and_then(|data| data.get("private"))
            .and_then(serde_json::Value::as_bool)
        {
            return private;
        }
        self.host != self.main_host
    }

    /// The first remote of the attached repository pointing at this project.
    pub fn remote(&self) -> Option<&Remote> {
        let repo = self.repo.as_ref()?;
        repo.remotes()
            .iter()
            .find(|remote| remote.project(repo).as_ref() == Some(self))
    }

    /// Browser URL for `path` within the project.
    ///
    /// Wiki projects (`name.wiki`) are shown under the main project's
    /// `/wiki` section: commit history maps to `/_history` and any other
    /// page gets the wiki's `_` special-page prefix.
    ///
    /// # Example
    ///
    /// ```
    /// use hubcap::core::settings::HostSettings;
    /// use hubcap::forge::Project;
    ///
    /// let hosts = HostSettings::default();
    /// let project = Project::new("alice", "repo", None, &hosts);
    /// assert_eq!(project.web_url(Some("/issues")), "https://github.com/alice/repo/issues");
    ///
    /// let wiki = Project::new("alice", "repo.wiki", None, &hosts);
    /// assert_eq!(
    ///     wiki.web_url(Some("/commits/abc")),
    ///     "https://github.com/alice/repo/wiki/_history"
    /// );
    /// ```
    pub fn web_url(&self, path: Option<&str>) -> String {
        let mut project_name = self.name_with_owner();
        let mut path = path.unwrap_or("").to_string();

        if let Some(stripped) = project_name.strip_suffix(".wiki") {
            project_name = stripped.to_string();
            if path != "/wiki" {
                let page = if path.starts_with("/commits/") {
                    "/_history".to_string()
                } else {
                    underscore_first_word(&path)
                };
                path = format!("/wiki{}", page);
            }
        }

        format!("https://{}/{}{}", self.host, project_name, path)
    }

    /// Clone URL for the project.
    ///
    /// HTTPS when asked for; SSH (`git@host:`) when asked for or when the
    /// project is private; the anonymous `git://` protocol otherwise.
    pub fn git_url(&self, options: GitUrlOptions) -> String {
        let scheme = if options.https {
            format!("https://{}/", self.host)
        } else if options.private || self.is_private() {
            format!("git@{}:", self.host)
        } else {
            format!("git://{}/", self.host)
        };

        format!("{}{}.git", scheme, self.name_with_owner())
    }
}

/// Prefix the first run of word characters with `_`.
fn underscore_first_word(path: &str) -> String {
    match path.find(|c: char| c.is_ascii_alphanumeric() || c == '_') {
        Some(i) => format!("{}_{}", &path[..i], &path[i..]),
        None => path.to_string(),
    }
}

impl PartialEq for Project {
    fn eq(&self, other: &Self) -> bool {
        self.owner == other.owner && self.name == other.name
    }
}

impl Eq for Project {}

impl fmt::Debug for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Project")
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("host", &self.host)
            .finish()
    }
}

impl fmt::Display for Project {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// Percent-decode one URL path segment; `None` if it is not valid UTF-8.
fn decode_segment(segment: &str) -> Option<std::borrow::Cow<'_, str>> {
    percent_decode_str(segment).decode_utf8().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::git::MockGit;
    use crate::ssh::StaticSshConfig;
    use std::rc::Rc;

    fn hosts() -> HostSettings {
        HostSettings::default()
    }

    fn repo_with(git: MockGit) -> LocalRepo {
        LocalRepo::new(
            "/work/repo",
            Rc::new(git),
            Rc::new(StaticSshConfig::new()),
            hosts(),
        )
    }

    fn repo() -> LocalRepo {
        repo_with(MockGit::new().with("config --get-all hub.host", "git.example.com"))
    }

    mod from_url {
        use super::*;

        #[test]
        fn https_url() {
            let url = Url::parse("https://github.com/alice/repo.git").unwrap();
            let project = Project::from_url(&url, &repo()).unwrap();
            assert_eq!(project.owner(), "alice");
            assert_eq!(project.name(), "repo");
            assert_eq!(project.host(), "github.com");
            assert!(project.repo().is_some());
        }

        #[test]
        fn extra_path_segments_ignored() {
            let url = Url::parse("https://github.com/alice/repo/tree/main").unwrap();
            let project = Project::from_url(&url, &repo()).unwrap();
            assert_eq!(project.name_with_owner(), "alice/repo");
        }

        #[test]
        fn percent_encoded_segments() {
            let url = Url::parse("https://github.com/team%20a/my%20repo.git").unwrap();
            let project = Project::from_url(&url, &repo()).unwrap();
            assert_eq!(project.name_with_owner(), "team a/my-repo");

            let url = Url::parse("https://github.com/alice/%FF").unwrap();
            assert!(Project::from_url(&url, &repo()).is_none());
        }

        #[test]
        fn configured_host_is_known() {
            let url = Url::parse("ssh://git@git.example.com/team/tool.git").unwrap();
            let project = Project::from_url(&url, &repo()).unwrap();
            assert_eq!(project.host(), "git.example.com");
            assert!(project.is_private());
        }

        #[test]
        fn ssh_alias_host_is_normalized() {
            let url = Url::parse("ssh://git@ssh.github.com/alice/repo.git").unwrap();
            let project = Project::from_url(&url, &repo()).unwrap();
            assert_eq!(project.host(), "github.com");
        }

        #[test]
        fn unknown_host_is_none() {
            let url = Url::parse("https://gitlab.com/alice/repo.git").unwrap();
            assert!(Project::from_url(&url, &repo()).is_none());
        }

        #[test]
        fn missing_name_is_none() {
            let url = Url::parse("https://github.com/alice").unwrap();
            assert!(Project::from_url(&url, &repo()).is_none());
            let url = Url::parse("https://github.com/").unwrap();
            assert!(Project::from_url(&url, &repo()).is_none());
        }
    }

    mod identity {
        use super::*;

        #[test]
        fn equality_ignores_host_and_repo() {
            let a = Project::new("alice", "repo", Some("github.com"), &hosts()).with_repo(repo());
            let b = Project::new("alice", "repo", Some("git.example.com"), &hosts());
            assert_eq!(a, b);
            assert_ne!(a, Project::new("bob", "repo", None, &hosts()));
        }

        #[test]
        fn owned_by_keeps_everything_else() {
            let project = Project::new("alice", "repo", Some("git.example.com"), &hosts());
            let fork = project.owned_by("bob");
            assert_eq!(fork.name_with_owner(), "bob/repo");
            assert_eq!(fork.host(), "git.example.com");
            assert_eq!(project.owner(), "alice");
        }

        #[test]
        fn display_is_name_with_owner() {
            let project = Project::new("alice", "repo", None, &hosts());
            assert_eq!(project.to_string(), "alice/repo");
        }
    }

    mod privacy {
        use super::*;

        #[test]
        fn main_host_is_public_by_default() {
            assert!(!Project::new("alice", "repo", None, &hosts()).is_private());
        }

        #[test]
        fn other_host_is_private_by_default() {
            let project = Project::new("alice", "repo", Some("ghe.corp"), &hosts());
            assert!(project.is_private());
        }

        #[test]
        fn metadata_wins() {
            let project = Project::new("alice", "repo", None, &hosts())
                .with_repo_data(serde_json::json!({ "private": true }));
            assert!(project.is_private());

            let project = Project::new("alice", "repo", Some("ghe.corp"), &hosts())
                .with_repo_data(serde_json::json!({ "private": false }));
            assert!(!project.is_private());
        }

        #[test]
        fn default_host_override_changes_default_only() {
            let ghe = HostSettings::new("ghe.corp");
            let project = Project::new("alice", "repo", None, &ghe);
            assert_eq!(project.host(), "ghe.corp");
            assert!(project.is_private());

            let project = Project::new("alice", "repo", Some("SSH.GHE.CORP"), &ghe);
            assert_eq!(project.host(), "GHE.CORP");
        }
    }

    mod web_url {
        use super::*;

        #[test]
        fn plain_project() {
            let project = Project::new("alice", "repo", None, &hosts());
            assert_eq!(project.web_url(None), "https://github.com/alice/repo");
            assert_eq!(
                project.web_url(Some("/pulls")),
                "https://github.com/alice/repo/pulls"
            );
        }

        #[test]
        fn wiki_commits_become_history() {
            let wiki = Project::new("alice", "repo.wiki", None, &hosts());
            assert_eq!(
                wiki.web_url(Some("/commits/abc")),
                "https://github.com/alice/repo/wiki/_history"
            );
        }

        #[test]
        fn wiki_pages_get_special_prefix() {
            let wiki = Project::new("alice", "repo.wiki", None, &hosts());
            assert_eq!(
                wiki.web_url(Some("/pages")),
                "https://github.com/alice/repo/wiki/_pages"
            );
            assert_eq!(wiki.web_url(None), "https://github.com/alice/repo/wiki");
            assert_eq!(
                wiki.web_url(Some("/wiki")),
                "https://github.com/alice/repo/wiki"
            );
        }
    }

    mod git_url {
        use super::*;

        #[test]
        fn schemes() {
            let project = Project::new("alice", "repo", None, &hosts());
            assert_eq!(
                project.git_url(GitUrlOptions::default()),
                "git://github.com/alice/repo.git"
            );
            assert_eq!(
                project.git_url(GitUrlOptions {
                    https: true,
                    ..Default::default()
                }),
                "https://github.com/alice/repo.git"
            );
            assert_eq!(
                project.git_url(GitUrlOptions {
                    private: true,
                    ..Default::default()
                }),
                "git@github.com:alice/repo.git"
            );
        }

        #[test]
        fn https_beats_private() {
            let project = Project::new("alice", "repo", Some("ghe.corp"), &hosts());
            let url = project.git_url(GitUrlOptions {
                https: true,
                private: true,
            });
            assert!(url.starts_with("https://"));
        }

        #[test]
        fn private_project_uses_ssh() {
            let project = Project::new("alice", "repo", Some("ghe.corp"), &hosts());
            assert!(project
                .git_url(GitUrlOptions::default())
                .starts_with("git@ghe.corp:"));
        }
    }

    mod remote {
        use super::*;

        #[test]
        fn finds_matching_remote() {
            let repo = repo_with(
                MockGit::new()
                    .with("remote", "upstream\norigin")
                    .with(
                        "remote -v",
                        "origin\tgit@github.com:bob/repo.git (fetch)\n\
                         upstream\thttps://github.com/alice/repo.git (fetch)",
                    ),
            );
            let project = Project::new("alice", "repo", None, &hosts()).with_repo(repo);
            assert_eq!(project.remote().map(Remote::name), Some("upstream"));
        }

        #[test]
        fn without_repo_is_none() {
            assert!(Project::new("alice", "repo", None, &hosts()).remote().is_none());
        }
    }
}
