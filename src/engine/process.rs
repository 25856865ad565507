//! engine::process
//!
//! The seam between the executor and the operating system.
//!
//! # Semantics
//!
//! - [`ProcessRunner::run`] spawns a child that inherits stdin, stdout,
//!   stderr, environment and working directory, and blocks until it exits.
//! - [`ProcessRunner::replace`] replaces the current process image. On Unix
//!   this is `execvp(3)` and never returns on success. Where the platform has
//!   no such facility the child is spawned, awaited, and its exit code is
//!   returned for the caller to exit with; nothing else may run in between.

use std::process::{Command as StdCommand, ExitStatus};

use super::exec::ExecuteError;

/// Runs external commands on behalf of the executor.
pub trait ProcessRunner {
    /// Run `argv` to completion and return its exit code.
    fn run(&mut self, argv: &[String]) -> Result<i32, ExecuteError>;

    /// Replace the current process with `argv`.
    ///
    /// Returning `Ok(code)` means replacement was emulated and the caller
    /// must exit with `code` immediately.
    fn replace(&mut self, argv: &[String]) -> Result<i32, ExecuteError>;
}

/// The real process runner.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProcess;

impl SystemProcess {
    /// Create a runner for the current platform.
    pub fn new() -> Self {
        Self
    }
}

fn split(argv: &[String]) -> Result<(&String, &[String]), ExecuteError> {
    argv.split_first().ok_or(ExecuteError::EmptyCommand)
}

impl ProcessRunner for SystemProcess {
    fn run(&mut self, argv: &[String]) -> Result<i32, ExecuteError> {
        let (program, args) = split(argv)?;
        let status = StdCommand::new(program)
            .args(args)
            .status()
            .map_err(|source| ExecuteError::Spawn {
                program: program.clone(),
                source,
            })?;
        Ok(exit_code(status))
    }

    #[cfg(unix)]
    fn replace(&mut self, argv: &[String]) -> Result<i32, ExecuteError> {
        use std::os::unix::process::CommandExt;

        let (program, args) = split(argv)?;
        // exec() only returns on error
        let source = StdCommand::new(program).args(args).exec();
        Err(ExecuteError::Replace {
            program: program.clone(),
            source,
        })
    }

    #[cfg(not(unix))]
    fn replace(&mut self, argv: &[String]) -> Result<i32, ExecuteError> {
        let (program, args) = split(argv)?;
        let status = StdCommand::new(program)
            .args(args)
            .status()
            .map_err(|source| ExecuteError::Replace {
                program: program.clone(),
                source,
            })?;
        Ok(exit_code(status))
    }
}

/// Exit code for a finished child, mapping signal deaths to `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    1
}
