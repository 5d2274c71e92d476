// src/exec/backend.rs

//! Pluggable process runner abstraction.
//!
//! The harness talks to a `ProcessRunner` instead of spawning processes
//! itself. Production code uses [`TokioProcessRunner`]; tests can provide a
//! runner that replays scripted output through the handlers without starting
//! anything.
//!
//! A runner never turns a nonzero exit into an error. It reports what
//! happened in a [`ProcessOutcome`] and leaves classification to
//! [`crate::exec::outcome::translate_outcome`]. `Err` is reserved for the
//! child never starting or the pipes failing.
//!
//! [`TokioProcessRunner`]: crate::exec::supervisor::TokioProcessRunner

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::time::Duration;

use crate::errors::Result;
use crate::exec::env::ResolvedEnvironment;
use crate::exec::output::OutputHandlers;
use crate::types::ProcessOutcome;

/// Fully resolved instructions for one child process.
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub program: PathBuf,
    pub args: Vec<String>,
    /// Complete environment; the child inherits nothing else.
    pub env: ResolvedEnvironment,
    pub working_dir: PathBuf,
    pub handlers: OutputHandlers,
    pub echo: bool,
    pub spinner: bool,
    pub timeout: Option<Duration>,
}

impl RunSpec {
    /// Command line for display, with arguments quoted where needed.
    pub fn command_line(&self) -> String {
        let mut parts = vec![shell_quote(&self.program.to_string_lossy())];
        parts.extend(self.args.iter().map(|a| shell_quote(a)));
        parts.join(" ")
    }
}

fn shell_quote(s: &str) -> String {
    let plain = !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:,+@%".contains(c));
    if plain {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

/// Trait abstracting how a child process is run to completion.
pub trait ProcessRunner: Send + Sync {
    /// Run the process described by `spec`.
    ///
    /// Output must reach `spec.handlers` while the child runs. If the child
    /// outlives `spec.timeout` it is killed and the outcome carries
    /// [`crate::types::TIMEOUT_STATUS`] plus whatever was captured so far.
    fn run(
        &self,
        spec: RunSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutcome>> + Send + '_>>;
}
