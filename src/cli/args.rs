//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! Hubcap takes one flag of its own, `--noop`, and only in leading position.
//! Everything from the first other token on is passed to git verbatim,
//! including `--help` and `--version`.

use clap::Parser;

/// Hubcap - run git with extra steps chained around it
#[derive(Parser, Debug)]
#[command(name = "hubcap")]
#[command(disable_help_flag = true, disable_version_flag = true)]
pub struct Cli {
    /// Print the commands that would run instead of running them
    #[arg(long)]
    pub noop: bool,

    /// Arguments for git
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}
