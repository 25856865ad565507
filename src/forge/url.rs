//! forge::url
//!
//! Web URLs that point into a hosted project.

use reqwest::Url;

use super::Project;
use crate::context::LocalRepo;

/// An `http`/`https` URL recognized as belonging to a hosted project.
#[derive(Debug, Clone)]
pub struct ResolvedUrl {
    url: Url,
    project: Project,
}

impl ResolvedUrl {
    /// Resolve `url` against the repository's known hosts.
    ///
    /// `None` for other schemes, unparsable input and unknown hosts.
    pub fn resolve(url: &str, repo: &LocalRepo) -> Option<Self> {
        let url = Url::parse(url).ok()?;
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        let project = Project::from_url(&url, repo)?;
        Some(Self { url, project })
    }

    /// The parsed URL.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// The project the URL points into.
    pub fn project(&self) -> &Project {
        &self.project
    }

    /// Name of the project the URL points into.
    pub fn project_name(&self) -> &str {
        self.project.name()
    }

    /// Owner of the project the URL points into.
    pub fn project_owner(&self) -> &str {
        self.project.owner()
    }

    /// The path after `/<owner>/<name>/`, e.g. `pull/12`.
    pub fn project_path(&self) -> Option<&str> {
        self.url.path().splitn(4, '/').nth(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::settings::HostSettings;
    use crate::git::MockGit;
    use crate::ssh::StaticSshConfig;
    use std::rc::Rc;

    fn repo() -> LocalRepo {
        LocalRepo::new(
            "/work/repo",
            Rc::new(MockGit::new()),
            Rc::new(StaticSshConfig::new()),
            HostSettings::default(),
        )
    }

    #[test]
    fn resolves_project_and_path() {
        let resolved =
            ResolvedUrl::resolve("https://github.com/alice/repo/blob/main/README.md", &repo())
                .unwrap();
        assert_eq!(resolved.project_owner(), "alice");
        assert_eq!(resolved.project_name(), "repo");
        assert_eq!(resolved.project_path(), Some("blob/main/README.md"));
        assert_eq!(resolved.url().scheme(), "https");
    }

    #[test]
    fn bare_project_has_no_path() {
        let resolved = ResolvedUrl::resolve("http://github.com/alice/repo", &repo()).unwrap();
        assert_eq!(resolved.project_path(), None);
        assert_eq!(resolved.project().host(), "github.com");
    }

    #[test]
    fn rejects_other_schemes_and_hosts() {
        assert!(ResolvedUrl::resolve("git://github.com/alice/repo.git", &repo()).is_none());
        assert!(ResolvedUrl::resolve("https://example.com/alice/repo", &repo()).is_none());
        assert!(ResolvedUrl::resolve("::not a url::", &repo()).is_none());
    }
}
