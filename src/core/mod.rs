//! core
//!
//! Configuration and run-wide settings.
//!
//! # Modules
//!
//! - [`config`] - Config file schema and loading
//! - [`settings`] - Environment/config/default resolution, done once per run

pub mod config;
pub mod settings;
