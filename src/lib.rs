// src/lib.rs

pub mod cli;
pub mod config;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod logging;
pub mod types;

use anyhow::Result;
use tracing::error;

use crate::cli::CliArgs;
use crate::config::{ConfigFile, load_or_default};
use crate::errors::ChildrunError;
use crate::errors::Result as ChildrunResult;
use crate::exec::{ConsoleSink, ExecutionRequest, Harness, StdConsole, TransientProfile};
use crate::types::{ProcessOutcome, Stream};

pub use crate::types::TIMEOUT_STATUS;

/// Exit code used by the CLI when the child timed out.
pub const TIMEOUT_EXIT_CODE: i32 = 124;

/// Exit code used by the CLI when captured output could not be written.
pub const OUTPUT_WRITE_EXIT_CODE: i32 = 1;

/// Run one request with the default harness (real processes, real files).
pub async fn execute(request: ExecutionRequest) -> ChildrunResult<ProcessOutcome> {
    Harness::default().execute(request).await
}

/// High-level entry point used by `main.rs`.
///
/// Returns the exit code the CLI should terminate with.
pub async fn run(args: CliArgs) -> Result<i32> {
    let cfg = load_or_default(args.config.as_deref())?;
    let request = request_from_args(&args, &cfg);
    let harness = Harness::with_runtime_vars(cfg.runtime.clone());

    if args.dry_run {
        print_dry_run(&harness, &request)?;
        return Ok(0);
    }

    // Without --show or a destination file the output would be lost, so the
    // CLI prints it once the child is done.
    let show = request.show;
    let replay_stdout = !show && request.stdout.is_none();
    let replay_stderr = !show && request.stderr.is_none();
    let replay = |outcome: &ProcessOutcome| {
        if replay_stdout {
            StdConsole.write(Stream::Stdout, &outcome.stdout);
        }
        if replay_stderr {
            StdConsole.write(Stream::Stderr, &outcome.stderr);
        }
    };

    match harness.execute(request).await {
        Ok(outcome) => {
            replay(&outcome);
            Ok(exit_code_for(outcome.status))
        }
        Err(ChildrunError::NonzeroStatus { outcome }) => {
            replay(&outcome);
            error!(status = outcome.status, "child exited with nonzero status");
            Ok(exit_code_for(outcome.status))
        }
        Err(ChildrunError::Timeout { timeout, outcome }) => {
            replay(&outcome);
            error!(timeout_ms = timeout.as_millis(), "child timed out");
            Ok(TIMEOUT_EXIT_CODE)
        }
        Err(ChildrunError::OutputWrite { reason, outcome }) => {
            // The destination files may be missing or partial.
            if !show {
                StdConsole.write(Stream::Stdout, &outcome.stdout);
                StdConsole.write(Stream::Stderr, &outcome.stderr);
            }
            error!(%reason, status = outcome.status, "could not write child output");
            Ok(OUTPUT_WRITE_EXIT_CODE)
        }
        Err(e) => Err(e.into()),
    }
}

/// Build the request from config defaults with CLI flags layered on top.
pub fn request_from_args(args: &CliArgs, cfg: &ConfigFile) -> ExecutionRequest {
    let mut request =
        ExecutionRequest::from_config(args.program.clone(), cfg).args(args.args.clone());

    if !args.libpath.is_empty() {
        request = request.libpath(args.libpath.clone());
    }
    for (name, url) in &args.repos {
        request = request.repo(name.clone(), url.clone());
    }
    for (key, value) in &args.env {
        request = request.env(key.clone(), value.clone());
    }
    if let Some(path) = &args.stdout {
        request = request.stdout_to(path.clone());
    }
    if let Some(path) = &args.stderr {
        request = request.stderr_to(path.clone());
    }
    if let Some(timeout) = args.timeout {
        request = request.timeout(timeout.0);
    }
    if let Some(dir) = &args.working_dir {
        request = request.working_dir(dir.clone());
    }

    // Flags can only switch a behaviour on (or, for fail-on-status, off)
    // relative to the config.
    let show = request.show || args.show;
    let echo = request.echo || args.echo;
    let spinner = request.spinner || args.spinner;
    let system_profile = request.system_profile || args.system_profile;
    let user_profile = request.user_profile || args.user_profile;
    let fail_on_status = request.fail_on_status && !args.no_fail_on_status;

    request
        .show(show)
        .echo(echo)
        .spinner(spinner)
        .system_profile(system_profile)
        .user_profile(user_profile)
        .fail_on_status(fail_on_status)
}

/// Map a child status to a process exit code.
fn exit_code_for(status: i32) -> i32 {
    if status >= 0 {
        status
    } else {
        // Killed by signal N: shells report 128 + N.
        128i32.saturating_add(status.saturating_neg())
    }
}

fn print_dry_run(harness: &Harness, request: &ExecutionRequest) -> ChildrunResult<()> {
    let profile = TransientProfile::create(&request.repos)?;
    let spec = harness.plan(request, &profile)?;
    let vars = harness.runtime_vars();

    println!("childrun dry-run");
    println!("  command: {}", spec.command_line());
    println!("  cwd: {}", spec.working_dir.display());
    println!("  timeout: {:?}", spec.timeout);
    println!("  fail_on_status: {}", request.fail_on_status);
    if let Some(path) = &request.stdout {
        println!("  stdout -> {}", path.display());
    }
    if let Some(path) = &request.stderr {
        println!("  stderr -> {}", path.display());
    }
    println!();

    println!("runtime variables:");
    let names = vars
        .library_vars
        .iter()
        .chain([&vars.system_profile_var, &vars.user_profile_var]);
    for name in names {
        match spec.env.get_os(name) {
            Some(value) => println!("  {name}={}", value.to_string_lossy()),
            None => println!("  {name} (unset; runtime default)"),
        }
    }
    for (key, value) in &request.env {
        println!("  {key}={value}");
    }

    profile.destroy();
    Ok(())
}
