//! git::reader
//!
//! The real plumbing executor.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use log::debug;

use super::Plumbing;

/// Runs git plumbing commands as subprocesses.
///
/// Output is cached per command string for the lifetime of the reader, so a
/// fact asked for twice in one run costs one process. The cache is not
/// synchronized; one reader serves one single-threaded run.
#[derive(Debug)]
pub struct GitReader {
    executable: Vec<String>,
    dir: Option<PathBuf>,
    cache: RefCell<HashMap<String, Option<String>>>,
}

impl GitReader {
    /// Create a reader for `executable` (program plus global flags).
    pub fn new(executable: Vec<String>) -> Self {
        Self {
            executable,
            dir: None,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Run commands in `dir` instead of the process working directory.
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = Some(dir.into());
        self
    }

    /// The executable this reader runs.
    pub fn executable(&self) -> &[String] {
        &self.executable
    }

    fn read(&self, cmd: &str) -> Option<String> {
        let (program, global) = self.executable.split_first()?;
        let words = shlex::split(cmd)?;

        let mut command = Command::new(program);
        command
            .args(global)
            .args(&words)
            .stdin(Stdio::null())
            .stderr(Stdio::null());
        if let Some(dir) = &self.dir {
            command.current_dir(dir);
        }

        match command.output() {
            Ok(output) if output.status.success() => {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            }
            Ok(output) => {
                debug!("git {} exited with {:?}", cmd, output.status.code());
                None
            }
            Err(err) => {
                debug!("git {} could not start: {}", cmd, err);
                None
            }
        }
    }
}

impl Plumbing for GitReader {
    fn command(&self, cmd: &str) -> Option<String> {
        if let Some(cached) = self.cache.borrow().get(cmd) {
            return cached.clone();
        }

        debug!("git {}", cmd);
        let output = self.read(cmd);
        self.cache
            .borrow_mut()
            .insert(cmd.to_string(), output.clone());
        output
    }
}
