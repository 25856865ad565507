//! engine
//!
//! Builds and runs the chain of commands for one invocation.
//!
//! # Architecture
//!
//! ```text
//! raw argv -> ArgumentList -> [augmentations] -> Executor
//! ```
//!
//! - [`args`] - The argument chain and its mutation primitives
//! - [`exec`] - The executor: skip / noop / run-in-order with replacement
//! - [`process`] - The process seam (blocking spawn, process replacement)
//!
//! # Invariants
//!
//! - The chain holds exactly one marker for the original command
//! - The argument list is not mutated once execution starts
//! - Replacing the process is the last thing a run does

pub mod args;
pub mod exec;
pub mod process;

pub use args::{ArgumentList, Callback, ChainError, Command, Step, StepSpec};
pub use exec::{render_command, render_commands, ExecuteError, ExecuteResult, Executor};
pub use process::{ProcessRunner, SystemProcess};
