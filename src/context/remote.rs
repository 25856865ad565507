//! context::remote
//!
//! A named git remote and the URLs configured for it.
//!
//! A `Remote` only carries its name and a URL cache. Lookups that need the
//! repository take it as a parameter, so remotes can live inside the
//! repository's own cache without a reference cycle.

use std::cell::OnceCell;
use std::fmt;

use log::debug;
use reqwest::Url;

use super::LocalRepo;
use crate::forge::Project;

/// A git remote.
#[derive(Debug, Clone)]
pub struct Remote {
    name: String,
    urls: OnceCell<Vec<(String, Url)>>,
}

impl Remote {
    /// A remote called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            urls: OnceCell::new(),
        }
    }

    /// The remote's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URLs by type (`fetch`, `push`), in listing order.
    ///
    /// Parsed from `git remote -v`. The first URL of each type wins; URLs
    /// that fail to parse are dropped.
    pub fn urls(&self, repo: &LocalRepo) -> &[(String, Url)] {
        self.urls.get_or_init(|| {
            let listing = repo.git().command("remote -v").unwrap_or_default();
            let mut urls: Vec<(String, Url)> = Vec::new();

            for line in listing.lines() {
                let Some((remote, uri, kind)) = parse_listing_line(line) else {
                    continue;
                };
                if remote != self.name || urls.iter().any(|(k, _)| k == kind) {
                    continue;
                }
                let Some(uri) = normalize_uri(uri) else {
                    continue;
                };
                match Self::uri_parse(repo, &uri) {
                    Some(url) => urls.push((kind.to_string(), url)),
                    None => debug!("dropping unparsable url for {}: {}", self.name, uri),
                }
            }

            urls
        })
    }

    /// The URL of one type, e.g. `fetch`.
    pub fn url(&self, repo: &LocalRepo, kind: &str) -> Option<&Url> {
        self.urls(repo)
            .iter()
            .find(|(k, _)| k == kind)
            .map(|(_, url)| url)
    }

    /// The hosted project behind the first recognizable URL.
    pub fn project(&self, repo: &LocalRepo) -> Option<Project> {
        self.urls(repo)
            .iter()
            .find_map(|(_, url)| Project::from_url(url, repo))
    }

    /// Parse a URI, applying `HostName` and `User` from the SSH config.
    ///
    /// Both options are looked up for the URI's original host; a value that
    /// is not configured is left as written.
    pub fn uri_parse(repo: &LocalRepo, uri: &str) -> Option<Url> {
        let mut url = Url::parse(uri).ok()?;
        let Some(host) = url.host_str().map(String::from) else {
            return Some(url);
        };

        let ssh = repo.ssh_config();
        if let Some(hostname) = ssh.get_value(&host, "hostname") {
            if hostname != host {
                url.set_host(Some(&hostname)).ok()?;
            }
        }
        if let Some(user) = ssh.get_value(&host, "user") {
            url.set_username(&user).ok()?;
        }

        Some(url)
    }
}

/// Split a `name<TAB>uri (type)` line.
fn parse_listing_line(line: &str) -> Option<(&str, &str, &str)> {
    let (remote, rest) = line.split_once('\t')?;
    let rest = rest.strip_suffix(')')?;
    let (uri, kind) = rest.rsplit_once(" (")?;
    if remote.is_empty() || uri.is_empty() || kind.is_empty() {
        return None;
    }
    Some((remote, uri, kind))
}

/// Give SCP-style `host:path` URIs an explicit `ssh://` scheme.
///
/// URIs that already have a scheme pass through; anything else is rejected.
fn normalize_uri(uri: &str) -> Option<String> {
    if has_scheme(uri) {
        return Some(uri.to_string());
    }
    let (host, path) = uri.split_once(':')?;
    if host.is_empty() || host.contains('/') {
        return None;
    }
    Some(format!("ssh://{}/{}", host, path))
}

fn has_scheme(uri: &str) -> bool {
    match uri.find("://") {
        Some(end) if end > 0 => uri[..end]
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'),
        _ => false,
    }
}

impl PartialEq for Remote {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Remote {}

impl PartialEq<str> for Remote {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Remote {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

impl fmt::Display for Remote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
