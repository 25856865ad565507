//! commands::version
//!
//! `git version` also reports the wrapper's version.

use anyhow::Result;

use super::Augmentation;
use crate::context::Context;
use crate::engine::{ArgumentList, StepSpec};

/// The wrapper's version, as reported after git's.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Appends `echo "hubcap version" <version>` to `version`/`--version`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Version;

impl Augmentation for Version {
    fn name(&self) -> &'static str {
        "version"
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["--version"]
    }

    fn augment(&self, args: &mut ArgumentList, _ctx: &Context) -> Result<()> {
        args.after(StepSpec::command("echo").with_args(["hubcap version", VERSION]))?;
        Ok(())
    }
}
