//! commands
//!
//! Per-command augmentation hooks.
//!
//! # Architecture
//!
//! An [`Augmentation`] is keyed by the git subcommand it extends. Before
//! execution the [`Registry`] looks at the first token of the argument list
//! and hands the list to the matching hook, which may:
//!
//! - add steps with `before`/`after`
//! - rewrite tokens or the executable
//! - `skip` or `noop` the run
//!
//! Commands without a hook pass through untouched.
//!
//! # Example
//!
//! ```
//! use std::rc::Rc;
//! use hubcap::commands::Registry;
//! use hubcap::context::Context;
//! use hubcap::core::settings::HostSettings;
//! use hubcap::engine::{render_command, ArgumentList};
//! use hubcap::git::MockGit;
//! use hubcap::ssh::StaticSshConfig;
//!
//! let ctx = Context::new(
//!     ".",
//!     Rc::new(MockGit::new()),
//!     Rc::new(StaticSshConfig::new()),
//!     HostSettings::default(),
//! );
//! let mut args = ArgumentList::with_executable(["status"], vec!["git".into()]);
//! Registry::builtin().run(&mut args, &ctx).unwrap();
//! assert_eq!(render_command(&args), "git status");
//! ```

mod version;

pub use version::Version;

use std::collections::HashMap;
use std::rc::Rc;

use anyhow::Result;
use log::debug;

use crate::context::Context;
use crate::engine::ArgumentList;

/// A hook that extends one git subcommand.
pub trait Augmentation {
    /// The subcommand this hook is registered under.
    fn name(&self) -> &'static str;

    /// Other tokens that select this hook.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    /// Modify the argument list before it runs.
    fn augment(&self, args: &mut ArgumentList, ctx: &Context) -> Result<()>;
}

/// Hooks keyed by subcommand.
#[derive(Default)]
pub struct Registry {
    hooks: HashMap<&'static str, Rc<dyn Augmentation>>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with the built-in hooks.
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Version);
        registry
    }

    /// Register a hook under its name and aliases. Later registrations
    /// replace earlier ones.
    pub fn register(&mut self, hook: impl Augmentation + 'static) {
        let hook: Rc<dyn Augmentation> = Rc::new(hook);
        self.hooks.insert(hook.name(), Rc::clone(&hook));
        for alias in hook.aliases() {
            self.hooks.insert(*alias, Rc::clone(&hook));
        }
    }

    /// The hook selected by `token`, if any.
    pub fn get(&self, token: &str) -> Option<&dyn Augmentation> {
        self.hooks.get(token).map(|hook| hook.as_ref())
    }

    /// Run the hook for the first token. Returns whether one ran.
    pub fn run(&self, args: &mut ArgumentList, ctx: &Context) -> Result<bool> {
        let Some(hook) = args.first().and_then(|token| self.hooks.get(token)).cloned() else {
            return Ok(false);
        };
        debug!("augmenting '{}'", hook.name());
        hook.augment(args, ctx)?;
        Ok(true)
    }
}
