//! engine::args
//!
//! The argument chain: git's raw argument vector plus the steps that run
//! around it.
//!
//! # Chain Model
//!
//! An [`ArgumentList`] owns the tokens of the original invocation and an
//! ordered chain of [`Step`]s. The chain always contains exactly one
//! [`Step::Original`] marker, the slot where the user's own command runs.
//!
//! ```text
//! before(a); before(b); after(c); after(d)
//!
//!     [a, b, Original, c, d]
//! ```
//!
//! `before` steps accumulate in call order right ahead of the marker, and
//! `after` steps accumulate in call order at the end of the chain.
//!
//! # Lifecycle
//!
//! The list is built once per invocation, mutated only by augmentations, and
//! then handed to the executor read-only.
//!
//! # Example
//!
//! ```
//! use hubcap::engine::args::{ArgumentList, StepSpec};
//!
//! let mut args = ArgumentList::with_executable(["push"], vec!["git".to_string()]);
//! args.before(StepSpec::git(["fetch"])).unwrap();
//! args.after(StepSpec::command("echo").with_args(["done"])).unwrap();
//!
//! let rendered: Vec<String> = args.commands().iter().map(|c| c.to_string()).collect();
//! assert_eq!(rendered, ["git fetch", "git push", "echo done"]);
//! ```

use std::fmt;
use std::ops::Index;
use std::rc::Rc;

use thiserror::Error;

/// Environment variable overriding the wrapped executable.
pub const EXECUTABLE_ENV: &str = "GIT";

/// Executable used when nothing overrides it.
pub const DEFAULT_EXECUTABLE: &str = "git";

/// Errors raised while building the chain.
///
/// These surface when an augmentation adds a step, never at execution time.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChainError {
    /// Step has neither a command, an argument list, nor a callback.
    #[error("command or callback required")]
    MissingCommand,

    /// Command string could not be split into words (unbalanced quotes).
    #[error("cannot split command into words: {command}")]
    InvalidCommand {
        /// The offending command string
        command: String,
    },
}

/// An in-process step.
///
/// The callback's success value is ignored; an error aborts the chain.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn() -> anyhow::Result<()>>);

impl Callback {
    /// Wrap a closure as a chain callback.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        Self(Rc::new(f))
    }

    /// Invoke the callback.
    pub fn call(&self) -> anyhow::Result<()> {
        (self.0)()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

/// One element of the chain.
#[derive(Debug, Clone)]
pub enum Step {
    /// An external command, already fully spelled out.
    Subprocess(Vec<String>),
    /// A closure invoked in-process.
    Callback(Callback),
    /// Where the original invocation runs.
    Original,
}

impl Step {
    /// Whether this is the original-command marker.
    pub fn is_original(&self) -> bool {
        matches!(self, Step::Original)
    }
}

/// A materialized chain element, ready to execute.
///
/// Produced by [`ArgumentList::commands`]; the marker has already been
/// replaced with the original command line.
#[derive(Debug, Clone)]
pub enum Command {
    /// Program followed by its arguments.
    Exec(Vec<String>),
    /// In-process callback.
    Callback(Callback),
}

impl Command {
    /// The argument vector, if this is an external command.
    pub fn argv(&self) -> Option<&[String]> {
        match self {
            Command::Exec(argv) => Some(argv),
            Command::Callback(_) => None,
        }
    }
}

impl fmt::Display for Command {
    /// Shell-like rendering used by `--noop`.
    ///
    /// Only arguments containing whitespace (or empty ones) are quoted; the
    /// output is for people to read, not for a shell to re-parse.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Exec(argv) => {
                let words: Vec<String> = argv.iter().map(|a| quote_argument(a)).collect();
                f.write_str(&words.join(" "))
            }
            Command::Callback(_) => f.write_str("<callback>"),
        }
    }
}

fn quote_argument(arg: &str) -> String {
    if arg.is_empty() || arg.chars().any(char::is_whitespace) {
        format!("'{}'", arg)
    } else {
        arg.to_string()
    }
}

/// Description of a step to add with [`ArgumentList::before`] or
/// [`ArgumentList::after`].
///
/// Resolution rules, checked in order:
///
/// 1. a callback becomes [`Step::Callback`]
/// 2. a command plus an argument list becomes `[command, args...]`
/// 3. an argument list alone is a git invocation: `executable ++ args`
/// 4. a command alone is split into words
///
/// A spec with none of these is rejected with [`ChainError::MissingCommand`].
#[derive(Debug, Clone, Default)]
pub struct StepSpec {
    command: Option<String>,
    args: Option<Vec<String>>,
    callback: Option<Callback>,
}

impl StepSpec {
    /// An empty spec. Adding it to a chain fails.
    pub fn new() -> Self {
        Self::default()
    }

    /// An external command, e.g. `"echo"` or `"make test"`.
    pub fn command(command: impl Into<String>) -> Self {
        Self {
            command: Some(command.into()),
            ..Self::default()
        }
    }

    /// A git invocation; the wrapped executable is prepended on resolution.
    pub fn git<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::default().with_args(args)
    }

    /// An in-process callback.
    pub fn callback<F>(f: F) -> Self
    where
        F: Fn() -> anyhow::Result<()> + 'static,
    {
        Self {
            callback: Some(Callback::new(f)),
            ..Self::default()
        }
    }

    /// Attach an argument list.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = Some(args.into_iter().map(Into::into).collect());
        self
    }

    fn resolve(self, list: &ArgumentList) -> Result<Step, ChainError> {
        if let Some(callback) = self.callback {
            return Ok(Step::Callback(callback));
        }

        match (self.command, self.args) {
            (Some(command), Some(args)) => {
                let mut argv = Vec::with_capacity(args.len() + 1);
                argv.push(command);
                argv.extend(args);
                Ok(Step::Subprocess(argv))
            }
            (None, Some(args)) => Ok(Step::Subprocess(list.to_exec_with(&args))),
            (Some(command), None) => {
                let words = shlex::split(&command)
                    .ok_or_else(|| ChainError::InvalidCommand {
                        command: command.clone(),
                    })?;
                if words.is_empty() {
                    return Err(ChainError::MissingCommand);
                }
                Ok(Step::Subprocess(words))
            }
            (None, None) => Err(ChainError::MissingCommand),
        }
    }
}

/// Resolve the wrapped executable from the environment.
///
/// `$GIT` wins when set and non-empty; otherwise `git`.
pub fn default_executable() -> Vec<String> {
    match std::env::var(EXECUTABLE_ENV) {
        Ok(value) if !value.trim().is_empty() => vec![value],
        _ => vec![DEFAULT_EXECUTABLE.to_string()],
    }
}

/// The raw argument vector plus the chain built around it.
#[derive(Debug, Clone)]
pub struct ArgumentList {
    tokens: Vec<String>,
    original: Vec<String>,
    executable: Vec<String>,
    skip: bool,
    noop: bool,
    chain: Vec<Step>,
}

impl ArgumentList {
    /// Wrap raw tokens, resolving the executable from the environment.
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::with_executable(tokens, default_executable())
    }

    /// Wrap raw tokens with an explicit executable.
    pub fn with_executable<I, S>(tokens: I, executable: Vec<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens: Vec<String> = tokens.into_iter().map(Into::into).collect();
        Self {
            original: tokens.clone(),
            tokens,
            executable,
            skip: false,
            noop: false,
            chain: vec![Step::Original],
        }
    }

    // =========================================================================
    // Chain Mutation
    // =========================================================================

    /// Append a step after everything already in the chain.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the spec cannot be resolved into a step.
    pub fn after(&mut self, spec: StepSpec) -> Result<(), ChainError> {
        let step = spec.resolve(self)?;
        self.chain.push(step);
        Ok(())
    }

    /// Insert a step immediately ahead of the original command.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError`] if the spec cannot be resolved into a step.
    pub fn before(&mut self, spec: StepSpec) -> Result<(), ChainError> {
        let step = spec.resolve(self)?;
        let marker = self.marker_index();
        self.chain.insert(marker, step);
        Ok(())
    }

    fn marker_index(&self) -> usize {
        // The marker is inserted at construction and never removed.
        self.chain
            .iter()
            .position(Step::is_original)
            .unwrap_or(self.chain.len())
    }

    /// Do not run anything for this invocation.
    pub fn skip(&mut self) {
        self.skip = true;
    }

    /// Print the chain instead of running it.
    pub fn noop(&mut self) {
        self.noop = true;
    }

    /// Whether [`skip`](Self::skip) was requested.
    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    /// Whether [`noop`](Self::noop) was requested.
    pub fn is_noop(&self) -> bool {
        self.noop
    }

    /// Append global flags to the executable, e.g. `-c core.pager=cat`.
    ///
    /// Affects every later [`to_exec`](Self::to_exec), including the original
    /// command and git steps added afterwards.
    pub fn add_exec_flags<I, S>(&mut self, flags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.executable.extend(flags.into_iter().map(Into::into));
    }

    /// Replace the executable (program plus any global flags).
    pub fn set_executable(&mut self, executable: Vec<String>) {
        self.executable = executable;
    }

    // =========================================================================
    // Materialization
    // =========================================================================

    /// The executable followed by any global flags.
    pub fn executable(&self) -> &[String] {
        &self.executable
    }

    /// The raw chain, marker included.
    pub fn steps(&self) -> &[Step] {
        &self.chain
    }

    /// Whether any step was added around the original command.
    pub fn is_chained(&self) -> bool {
        self.chain.len() > 1
    }

    /// Whether the chain or the tokens differ from what was passed in.
    pub fn is_changed(&self) -> bool {
        self.is_chained() || self.tokens != self.original
    }

    /// `executable ++ tokens`: the original command line.
    pub fn to_exec(&self) -> Vec<String> {
        self.to_exec_with(&self.tokens)
    }

    /// `executable ++ args` for an arbitrary git argument list.
    pub fn to_exec_with(&self, args: &[String]) -> Vec<String> {
        let mut argv = Vec::with_capacity(self.executable.len() + args.len());
        argv.extend(self.executable.iter().cloned());
        argv.extend(args.iter().cloned());
        argv
    }

    /// Materialize the chain, substituting the marker with [`to_exec`](Self::to_exec).
    pub fn commands(&self) -> Vec<Command> {
        self.chain
            .iter()
            .map(|step| match step {
                Step::Original => Command::Exec(self.to_exec()),
                Step::Subprocess(argv) => Command::Exec(argv.clone()),
                Step::Callback(callback) => Command::Callback(callback.clone()),
            })
            .collect()
    }

    // =========================================================================
    // Token Introspection
    // =========================================================================

    /// Tokens that do not start with `-`.
    pub fn words(&self) -> Vec<&str> {
        self.tokens
            .iter()
            .filter(|t| !t.starts_with('-'))
            .map(String::as_str)
            .collect()
    }

    /// Tokens that are not [`words`](Self::words), in order.
    pub fn flags(&self) -> Vec<&str> {
        let words = self.words();
        self.tokens
            .iter()
            .map(String::as_str)
            .filter(|t| !words.contains(t))
            .collect()
    }

    /// Whether any token is one of `names`, either bare or as `name=value`.
    pub fn has_flag(&self, names: &[&str]) -> bool {
        self.tokens.iter().any(|token| {
            names.iter().any(|name| match token.strip_prefix(name) {
                Some(rest) => rest.is_empty() || rest.starts_with('='),
                None => false,
            })
        })
    }

    // =========================================================================
    // Sequence Operations
    // =========================================================================

    /// The current tokens.
    pub fn as_slice(&self) -> &[String] {
        &self.tokens
    }

    /// Number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Whether there are no tokens.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Token at `index`.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.tokens.get(index).map(String::as_str)
    }

    /// First token, usually the git subcommand.
    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    /// Whether `token` appears verbatim.
    pub fn contains(&self, token: &str) -> bool {
        self.tokens.iter().any(|t| t == token)
    }

    /// Position of `token`, if present.
    pub fn position(&self, token: &str) -> Option<usize> {
        self.tokens.iter().position(|t| t == token)
    }

    /// Iterate over the tokens.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tokens.iter().map(String::as_str)
    }

    /// Append a token.
    pub fn push(&mut self, token: impl Into<String>) {
        self.tokens.push(token.into());
    }

    /// Insert a token at `index`, clamped to the end.
    pub fn insert(&mut self, index: usize, token: impl Into<String>) {
        let index = index.min(self.tokens.len());
        self.tokens.insert(index, token.into());
    }

    /// Remove and return the token at `index`.
    pub fn remove(&mut self, index: usize) -> Option<String> {
        (index < self.tokens.len()).then(|| self.tokens.remove(index))
    }

    /// Overwrite the token at `index`, returning the previous value.
    pub fn set(&mut self, index: usize, token: impl Into<String>) -> Option<String> {
        self.tokens
            .get_mut(index)
            .map(|slot| std::mem::replace(slot, token.into()))
    }
}

impl Index<usize> for ArgumentList {
    type Output = str;

    fn index(&self, index: usize) -> &str {
        &self.tokens[index]
    }
}
