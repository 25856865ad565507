//! forge
//!
//! Hosted projects and the URLs that identify them.
//!
//! # Architecture
//!
//! A remote URL is only interesting when its host is one the repository
//! knows about (see [`LocalRepo::known_hosts`](crate::context::LocalRepo::known_hosts)).
//! Recognized URLs become a [`Project`]: an `owner/name` identity on a host,
//! from which browser and clone URLs are derived.
//!
//! - [`project`]: project identity, web and clone URLs
//! - [`url`]: `http(s)` URLs pointing into a project
//!
//! No network access happens here. Repository metadata (for example the
//! `private` flag) is supplied by the caller as JSON.
//!
//! # Example
//!
//! ```
//! use hubcap::core::settings::HostSettings;
//! use hubcap::forge::{GitUrlOptions, Project};
//!
//! let project = Project::new("alice", "repo", None, &HostSettings::default());
//! assert_eq!(
//!     project.git_url(GitUrlOptions { https: true, ..Default::default() }),
//!     "https://github.com/alice/repo.git"
//! );
//! ```

pub mod project;
pub mod url;

pub use project::{GitUrlOptions, Project};
pub use url::ResolvedUrl;
