//! ui
//!
//! User-facing output.
//!
//! # Modules
//!
//! - [`output`] - Error and warning messages
//!
//! # Design
//!
//! Hubcap's own messages go through this module; planned commands in
//! `--noop` mode are written by the executor to the writer it is given.

pub mod output;
