//! ui::output
//!
//! Messages from hubcap itself, as opposed to output of the commands it runs.
//!
//! # Design
//!
//! Both go to stderr so they never mix into git's stdout, which scripts
//! may be parsing.

use std::fmt::Display;

/// Print an error message.
pub fn error(message: impl Display) {
    eprintln!("{}", format_error(message));
}

/// Print a warning message.
pub fn warn(message: impl Display) {
    eprintln!("{}", format_warning(message));
}

fn format_error(message: impl Display) -> String {
    format!("error: {}", message)
}

fn format_warning(message: impl Display) -> String {
    format!("warning: {}", message)
}
