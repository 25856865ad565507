//! engine::exec
//!
//! The chain executor.
//!
//! # Executor Contract
//!
//! Given a resolved [`ArgumentList`]:
//!
//! 1. If skip was requested, do nothing.
//! 2. Else if noop was requested, print the planned commands and spawn nothing.
//! 3. Else run the materialized chain in order:
//!    - callbacks run in-process; an error aborts the run
//!    - a non-final external command blocks; a non-zero exit ends the run
//!      with that exit code and no later step runs
//!    - the final external command replaces the current process
//!
//! # Invariants
//!
//! - Steps never run in parallel and are never retried
//! - Already-executed steps are not rolled back
//! - Nothing runs after process replacement
//!
//! # Example
//!
//! ```no_run
//! use hubcap::engine::args::ArgumentList;
//! use hubcap::engine::exec::Executor;
//! use hubcap::engine::process::SystemProcess;
//!
//! let args = ArgumentList::new(["status"]);
//! let mut executor = Executor::new(SystemProcess::new());
//! let result = executor.execute(&args, &mut std::io::stdout()).unwrap();
//! std::process::exit(result.exit_code());
//! ```

use std::io::{self, Write};

use log::debug;
use thiserror::Error;

use super::args::{ArgumentList, Command};
use super::process::ProcessRunner;

/// Errors from chain execution.
///
/// A step exiting non-zero is not an error; see [`ExecuteResult::Failed`].
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// A subprocess step had no program.
    #[error("empty command in chain")]
    EmptyCommand,

    /// A blocking step could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        /// The program that failed to start
        program: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// Replacing the current process failed.
    #[error("failed to exec '{program}': {source}")]
    Replace {
        /// The program that could not be exec'd
        program: String,
        /// Underlying I/O error
        source: io::Error,
    },

    /// A callback step returned an error.
    #[error("callback failed: {0:#}")]
    Callback(anyhow::Error),

    /// Writing planned or echoed output failed.
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

/// Result of executing a chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteResult {
    /// Skip was requested; nothing ran.
    Skipped,

    /// Noop was requested; the rendered commands were printed.
    Planned {
        /// Rendered commands, one per step.
        commands: Vec<String>,
    },

    /// Every step ran and the last one did not replace the process
    /// (a callback, or `echo` printed in-process).
    Completed,

    /// A non-final step exited non-zero; later steps did not run.
    Failed {
        /// Zero-based index of the failing step.
        index: usize,
        /// Its exit code.
        code: i32,
    },

    /// The final step "replaced" the process but control came back: either
    /// the platform emulates replacement, or a test runner intercepted it.
    Replaced {
        /// Exit code the process must terminate with.
        code: i32,
    },
}

impl ExecuteResult {
    /// The exit code the hubcap process should terminate with.
    pub fn exit_code(&self) -> i32 {
        match self {
            ExecuteResult::Skipped | ExecuteResult::Planned { .. } | ExecuteResult::Completed => 0,
            ExecuteResult::Failed { code, .. } | ExecuteResult::Replaced { code } => *code,
        }
    }

    /// Check if execution ended on a failing step.
    pub fn is_failed(&self) -> bool {
        matches!(self, ExecuteResult::Failed { .. })
    }
}

/// Render every command of the chain for display.
pub fn render_commands(args: &ArgumentList) -> Vec<String> {
    args.commands().iter().map(ToString::to_string).collect()
}

/// One-line rendering of the whole chain; empty when skipped.
pub fn render_command(args: &ArgumentList) -> String {
    if args.is_skipped() {
        String::new()
    } else {
        render_commands(args).join("; ")
    }
}

/// The executor.
pub struct Executor<R: ProcessRunner> {
    runner: R,
    portable_echo: bool,
}

impl<R: ProcessRunner> Executor<R> {
    /// Create an executor. `echo` is printed in-process on Windows.
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            portable_echo: cfg!(windows),
        }
    }

    /// Override whether a final `echo` step is printed in-process.
    pub fn with_portable_echo(mut self, enabled: bool) -> Self {
        self.portable_echo = enabled;
        self
    }

    /// The underlying runner.
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Execute an argument list, writing noop/echo output to `out`.
    pub fn execute(
        &mut self,
        args: &ArgumentList,
        out: &mut dyn Write,
    ) -> Result<ExecuteResult, ExecuteError> {
        if args.is_skipped() {
            debug!("skip requested, nothing to run");
            return Ok(ExecuteResult::Skipped);
        }

        if args.is_noop() {
            debug!("noop requested, printing chain");
            let commands = render_commands(args);
            for command in &commands {
                writeln!(out, "{}", command)?;
            }
            return Ok(ExecuteResult::Planned { commands });
        }

        self.execute_chain(&args.commands(), out)
    }

    /// Run materialized commands in order.
    pub fn execute_chain(
        &mut self,
        commands: &[Command],
        out: &mut dyn Write,
    ) -> Result<ExecuteResult, ExecuteError> {
        let last = commands.len().saturating_sub(1);

        for (i, command) in commands.iter().enumerate() {
            debug!("step {}/{}: {}", i + 1, commands.len(), command);

            match command {
                Command::Callback(callback) => {
                    callback.call().map_err(ExecuteError::Callback)?;
                }
                Command::Exec(argv) if i == last => {
                    return self.replace(argv, out);
                }
                Command::Exec(argv) => {
                    let code = self.runner.run(argv)?;
                    if code != 0 {
                        debug!("step {} exited with {}, stopping", i + 1, code);
                        return Ok(ExecuteResult::Failed { index: i, code });
                    }
                }
            }
        }

        Ok(ExecuteResult::Completed)
    }

    fn replace(
        &mut self,
        argv: &[String],
        out: &mut dyn Write,
    ) -> Result<ExecuteResult, ExecuteError> {
        if self.portable_echo && argv.first().map(String::as_str) == Some("echo") {
            writeln!(out, "{}", argv[1..].join(" "))?;
            return Ok(ExecuteResult::Completed);
        }

        out.flush()?;
        let code = self.runner.replace(argv)?;
        Ok(ExecuteResult::Replaced { code })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::args::StepSpec;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    /// Records every command and answers with canned exit codes.
    #[derive(Default)]
    struct RecordingRunner {
        ran: Vec<Vec<String>>,
        replaced: Vec<Vec<String>>,
        codes: HashMap<String, i32>,
    }

    impl RecordingRunner {
        fn failing(program: &str, code: i32) -> Self {
            let mut runner = Self::default();
            runner.codes.insert(program.to_string(), code);
            runner
        }
    }

    impl ProcessRunner for RecordingRunner {
        fn run(&mut self, argv: &[String]) -> Result<i32, ExecuteError> {
            self.ran.push(argv.to_vec());
            Ok(self.codes.get(&argv[0]).copied().unwrap_or(0))
        }

        fn replace(&mut self, argv: &[String]) -> Result<i32, ExecuteError> {
            self.replaced.push(argv.to_vec());
            Ok(self.codes.get(&argv[0]).copied().unwrap_or(0))
        }
    }

    fn git_args(tokens: &[&str]) -> ArgumentList {
        ArgumentList::with_executable(tokens.iter().copied(), vec!["git".to_string()])
    }

    mod execute {
        use super::*;

        #[test]
        fn skip_runs_nothing() {
            let mut args = git_args(&["push"]);
            args.before(StepSpec::command("step1")).unwrap();
            args.skip();

            let mut out: Vec<u8> = Vec::new();
            let mut executor = Executor::new(RecordingRunner::default());
            let result = executor.execute(&args, &mut out).unwrap();

            assert_eq!(result, ExecuteResult::Skipped);
            assert_eq!(result.exit_code(), 0);
            assert!(executor.runner().ran.is_empty());
            assert!(executor.runner().replaced.is_empty());
            assert!(out.is_empty());
            assert_eq!(render_command(&args), "");
        }

        #[test]
        fn noop_prints_and_spawns_nothing() {
            let mut args = git_args(&["commit", "-m", "a message"]);
            args.after(StepSpec::command("echo").with_args(["done"])).unwrap();
            args.noop();

            let mut out: Vec<u8> = Vec::new();
            let mut executor = Executor::new(RecordingRunner::default());
            let result = executor.execute(&args, &mut out).unwrap();

            assert_eq!(
                String::from_utf8(out).unwrap(),
                "git commit -m 'a message'\necho done\n"
            );
            assert_eq!(result.exit_code(), 0);
            assert!(executor.runner().ran.is_empty());
            assert!(executor.runner().replaced.is_empty());
        }

        #[test]
        fn skip_wins_over_noop() {
            let mut args = git_args(&["push"]);
            args.noop();
            args.skip();
            let mut out: Vec<u8> = Vec::new();
            let result = Executor::new(RecordingRunner::default())
                .execute(&args, &mut out)
                .unwrap();
            assert_eq!(result, ExecuteResult::Skipped);
            assert!(out.is_empty());
        }

        #[test]
        fn single_command_replaces_process() {
            let args = git_args(&["status"]);
            let mut executor = Executor::new(RecordingRunner::default());
            let result = executor.execute(&args, &mut io::sink()).unwrap();

            assert_eq!(result, ExecuteResult::Replaced { code: 0 });
            assert!(executor.runner().ran.is_empty());
            assert_eq!(
                executor.runner().replaced,
                vec![["git", "status"].map(String::from).to_vec()]
            );
        }

        #[test]
        fn render_command_joins_steps() {
            let mut args = git_args(&["push"]);
            args.before(StepSpec::git(["fetch"])).unwrap();
            assert_eq!(render_command(&args), "git fetch; git push");
        }
    }

    mod chain {
        use super::*;

        #[test]
        fn intermediate_steps_block_then_last_replaces() {
            let mut args = git_args(&["push"]);
            args.before(StepSpec::git(["fetch"])).unwrap();
            args.after(StepSpec::command("notify")).unwrap();

            let mut executor = Executor::new(RecordingRunner::default());
            let result = executor.execute(&args, &mut io::sink()).unwrap();

            assert_eq!(result, ExecuteResult::Replaced { code: 0 });
            let ran: Vec<String> = executor.runner().ran.iter().map(|c| c.join(" ")).collect();
            assert_eq!(ran, ["git fetch", "git push"]);
            assert_eq!(executor.runner().replaced, vec![vec!["notify".to_string()]]);
        }

        #[test]
        fn failing_step_stops_the_chain() {
            let mut args = git_args(&["push"]);
            args.before(StepSpec::command("step1")).unwrap();
            args.after(StepSpec::command("step3")).unwrap();

            let mut executor = Executor::new(RecordingRunner::failing("step1", 2));
            let result = executor.execute(&args, &mut io::sink()).unwrap();

            assert_eq!(result, ExecuteResult::Failed { index: 0, code: 2 });
            assert_eq!(result.exit_code(), 2);
            assert!(result.is_failed());
            assert_eq!(executor.runner().ran.len(), 1);
            assert!(executor.runner().replaced.is_empty());
        }

        #[test]
        fn final_exit_code_is_forwarded() {
            let args = git_args(&["status"]);
            let mut executor = Executor::new(RecordingRunner::failing("git", 128));
            let result = executor.execute(&args, &mut io::sink()).unwrap();
            assert_eq!(result.exit_code(), 128);
        }

        #[test]
        fn callbacks_run_in_order() {
            let log = Rc::new(RefCell::new(Vec::new()));
            let mut args = git_args(&["push"]);

            let before_log = Rc::clone(&log);
            args.before(StepSpec::callback(move || {
                before_log.borrow_mut().push("before");
                Ok(())
            }))
            .unwrap();
            let after_log = Rc::clone(&log);
            args.after(StepSpec::callback(move || {
                after_log.borrow_mut().push("after");
                Ok(())
            }))
            .unwrap();

            let mut executor = Executor::new(RecordingRunner::default());
            let result = executor.execute(&args, &mut io::sink()).unwrap();

            assert_eq!(result, ExecuteResult::Completed);
            assert_eq!(*log.borrow(), ["before", "after"]);
            // The original command was not last, so it blocked instead of replacing.
            assert_eq!(executor.runner().ran.len(), 1);
            assert!(executor.runner().replaced.is_empty());
        }

        #[test]
        fn callback_error_aborts() {
            let mut args = git_args(&["push"]);
            args.before(StepSpec::callback(|| Err(anyhow::anyhow!("no upstream"))))
                .unwrap();

            let mut executor = Executor::new(RecordingRunner::default());
            let err = executor.execute(&args, &mut io::sink()).unwrap_err();

            assert!(matches!(err, ExecuteError::Callback(_)));
            assert!(err.to_string().contains("no upstream"));
            assert!(executor.runner().ran.is_empty());
            assert!(executor.runner().replaced.is_empty());
        }

        #[test]
        fn portable_echo_prints_instead_of_spawning() {
            let mut args = git_args(&["version"]);
            args.after(StepSpec::command("echo").with_args(["hubcap version", "0.1.0"]))
                .unwrap();

            let mut out: Vec<u8> = Vec::new();
            let mut executor =
                Executor::new(RecordingRunner::default()).with_portable_echo(true);
            let result = executor.execute(&args, &mut out).unwrap();

            assert_eq!(result, ExecuteResult::Completed);
            assert_eq!(String::from_utf8(out).unwrap(), "hubcap version 0.1.0\n");
            assert!(executor.runner().replaced.is_empty());
        }

        #[test]
        fn echo_is_exec_when_not_portable() {
            let mut args = git_args(&["version"]);
            args.after(StepSpec::command("echo hi")).unwrap();

            let mut executor =
                Executor::new(RecordingRunner::default()).with_portable_echo(false);
            executor.execute(&args, &mut io::sink()).unwrap();
            assert_eq!(
                executor.runner().replaced,
                vec![["echo", "hi"].map(String::from).to_vec()]
            );
        }

        #[test]
        fn empty_chain_completes() {
            let mut executor = Executor::new(RecordingRunner::default());
            let result = executor.execute_chain(&[], &mut io::sink()).unwrap();
            assert_eq!(result, ExecuteResult::Completed);
        }
    }

    mod execute_error {
        use super::*;

        #[test]
        fn display_spawn() {
            let err = ExecuteError::Spawn {
                program: "git".to_string(),
                source: io::Error::new(io::ErrorKind::NotFound, "not found"),
            };
            let msg = err.to_string();
            assert!(msg.contains("failed to run"));
            assert!(msg.contains("git"));
        }

        #[test]
        fn display_empty() {
            assert_eq!(ExecuteError::EmptyCommand.to_string(), "empty command in chain");
        }
    }
}
