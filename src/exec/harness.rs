// src/exec/harness.rs

//! One supervised child run, end to end.
//!
//! `Harness::execute` is the whole call:
//!
//! 1. resolve the working directory
//! 2. write the transient profile
//! 3. resolve the child's environment
//! 4. build the output handlers
//! 5. run the child under the [`ProcessRunner`]
//! 6. write captured output to the requested files
//! 7. classify the outcome
//!
//! The profile is removed on every path out of `execute`. Nothing here
//! touches process-wide state, so concurrent calls on one `Harness` are
//! independent.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::errors::{ChildrunError, Result};
use crate::exec::backend::{ProcessRunner, RunSpec};
use crate::exec::env::{RuntimeVars, caller_environment, resolve_environment};
use crate::exec::outcome::translate_outcome;
use crate::exec::output::{ConsoleSink, StdConsole, build_handlers};
use crate::exec::profile::TransientProfile;
use crate::exec::request::ExecutionRequest;
use crate::exec::supervisor::TokioProcessRunner;
use crate::exec::writer::write_outputs;
use crate::fs::{FileSystem, RealFileSystem};
use crate::types::ProcessOutcome;

#[derive(Clone)]
pub struct Harness {
    runner: Arc<dyn ProcessRunner>,
    fs: Arc<dyn FileSystem>,
    console: Arc<dyn ConsoleSink>,
    vars: RuntimeVars,
}

impl Harness {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        fs: Arc<dyn FileSystem>,
        console: Arc<dyn ConsoleSink>,
        vars: RuntimeVars,
    ) -> Self {
        Self {
            runner,
            fs,
            console,
            vars,
        }
    }

    /// Harness that spawns real processes and writes to the real console and
    /// filesystem.
    pub fn with_runtime_vars(vars: RuntimeVars) -> Self {
        let console: Arc<dyn ConsoleSink> = Arc::new(StdConsole);
        Self::new(
            Arc::new(TokioProcessRunner::new(Arc::clone(&console))),
            Arc::new(RealFileSystem),
            console,
            vars,
        )
    }

    pub fn runtime_vars(&self) -> &RuntimeVars {
        &self.vars
    }

    /// Run `request` and return its outcome, or the timeout / nonzero-status
    /// error carrying the same captured output.
    pub async fn execute(&self, request: ExecutionRequest) -> Result<ProcessOutcome> {
        let working_dir = resolve_working_dir(request.working_dir.as_ref())?;
        let profile = TransientProfile::create(&request.repos)?;

        let result = self.run_with_profile(&request, working_dir, &profile).await;

        profile.destroy();
        result
    }

    /// Build the [`RunSpec`] a request would run with, without running it.
    ///
    /// `profile` must outlive any use of the returned spec.
    pub fn plan(&self, request: &ExecutionRequest, profile: &TransientProfile) -> Result<RunSpec> {
        let working_dir = resolve_working_dir(request.working_dir.as_ref())?;
        Ok(self.build_spec(request, working_dir, profile))
    }

    async fn run_with_profile(
        &self,
        request: &ExecutionRequest,
        working_dir: PathBuf,
        profile: &TransientProfile,
    ) -> Result<ProcessOutcome> {
        let spec = self.build_spec(request, working_dir, profile);
        let outcome = self.runner.run(spec).await?;

        // A destination that cannot be written must not cost the caller the
        // captured output.
        if let Err(e) = write_outputs(
            self.fs.as_ref(),
            &outcome,
            request.stdout.as_deref(),
            request.stderr.as_deref(),
        ) {
            warn!(error = %e, status = outcome.status, "failed to persist child output");
            return Err(ChildrunError::OutputWrite {
                reason: format!("{e:#}"),
                outcome,
            });
        }

        translate_outcome(outcome, request.fail_on_status, request.timeout)
    }

    fn build_spec(
        &self,
        request: &ExecutionRequest,
        working_dir: PathBuf,
        profile: &TransientProfile,
    ) -> RunSpec {
        let caller_env = caller_environment(&request.env);
        let env = resolve_environment(
            &caller_env,
            &request.libpath,
            profile.path(),
            request.system_profile,
            request.user_profile,
            &self.vars,
        );
        debug!(vars = env.len(), "resolved child environment");

        let handlers = build_handlers(
            request.show,
            request.line_callback.clone(),
            request.block_callback.clone(),
            Arc::clone(&self.console),
        );

        info!(
            program = %request.program.display(),
            cwd = %working_dir.display(),
            fail_on_status = request.fail_on_status,
            "executing request"
        );

        RunSpec {
            program: request.program.clone(),
            args: request.args.clone(),
            env,
            working_dir,
            handlers,
            echo: request.echo,
            spinner: request.spinner,
            timeout: request.timeout,
        }
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::with_runtime_vars(RuntimeVars::default())
    }
}

/// Absolute working directory for the child: `dir` joined onto the host's
/// current directory, or the current directory itself.
fn resolve_working_dir(dir: Option<&PathBuf>) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    Ok(match dir {
        Some(dir) => cwd.join(dir),
        None => cwd,
    })
}
