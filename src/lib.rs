//! Hubcap - a git wrapper that chains extra steps around git commands
//!
//! Hubcap receives the raw argument vector meant for git, lets augmentations
//! insert steps before or after the original command (or skip it entirely),
//! and then runs the resulting chain: intermediate steps block, the final
//! step replaces the hubcap process.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line front-end (parses `--noop`, wires everything up)
//! - [`commands`] - Augmentation registry consulted before execution
//! - [`engine`] - Argument chain and the chain executor
//! - [`context`] - Lazily memoized model of the current repository
//! - [`forge`] - Hosted project identity and URLs
//! - [`git`] - Plumbing executor for the underlying git binary
//! - [`ssh`] - SSH client configuration lookups
//! - [`core`] - Configuration loading and settings resolution
//! - [`ui`] - User-facing output
//!
//! # Correctness Invariants
//!
//! 1. An argument chain always holds exactly one marker for the original command
//! 2. Steps run strictly in chain order; the first failing step ends the run
//! 3. Replacing the process is the last observable action of a run
//! 4. Repository facts are computed at most once per run

pub mod cli;
pub mod commands;
pub mod context;
pub mod core;
pub mod engine;
pub mod forge;
pub mod git;
pub mod ssh;
pub mod ui;
