//! cli
//!
//! Command-line front-end for Hubcap.
//!
//! # Responsibilities
//!
//! - Parse the leading `--noop` flag, keep the rest for git
//! - Load configuration and resolve settings once
//! - Build the context, run augmentations, hand the chain to the executor
//!
//! # Architecture
//!
//! The CLI layer is thin. Logging is set up by the binary; everything after
//! that flows through [`run_from`], which returns the process exit code.

pub mod args;

pub use args::Cli;

use std::ffi::OsString;
use std::io::{self, Write};

use anyhow::{Context as _, Result};
use clap::Parser;
use log::debug;

use crate::commands::Registry;
use crate::context::Context;
use crate::core::config::Config;
use crate::core::settings::Settings;
use crate::engine::{ArgumentList, Executor, SystemProcess};
use crate::ui::output;

/// Run the CLI application with the process arguments.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<i32> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_from(std::env::args_os(), &mut out)
}

/// Run with an explicit argument vector (program name first), writing
/// planned commands to `out`.
pub fn run_from<I, T>(argv: I, out: &mut dyn Write) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::try_parse_from(argv)?;

    let loaded = Config::load().context("failed to load configuration")?;
    for warning in &loaded.warnings {
        output::warn(format!("{} ({})", warning.message, warning.path.display()));
    }
    if let Some(path) = loaded.config.loaded_from() {
        debug!("config loaded from {}", path.display());
    }
    let settings = Settings::resolve(&loaded.config);

    let cwd = std::env::current_dir().context("failed to read the working directory")?;
    let ctx = Context::for_dir(cwd, &settings);

    let mut args = ArgumentList::with_executable(cli.args, settings.executable.clone());
    if cli.noop {
        args.noop();
    }

    Registry::builtin().run(&mut args, &ctx)?;

    let mut executor = Executor::new(SystemProcess::new());
    let result = executor.execute(&args, out)?;
    debug!("run finished: {:?}", result);
    Ok(result.exit_code())
}
