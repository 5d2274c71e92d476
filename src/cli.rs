// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::Timeout;

/// Command-line arguments for `childrun`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "childrun",
    version,
    about = "Run a child runtime process under a timeout and capture its output.",
    long_about = None
)]
pub struct CliArgs {
    /// Program to run.
    #[arg(value_name = "PROGRAM")]
    pub program: PathBuf,

    /// Arguments passed to the program (after any configured `cmdargs`).
    #[arg(value_name = "ARGS", trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `$CHILDRUN_CONFIG`, else `Childrun.toml` if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Library directory for the child (repeatable, order preserved).
    /// Replaces the configured list when given.
    #[arg(long = "libpath", value_name = "DIR")]
    pub libpath: Vec<String>,

    /// Repository `NAME=URL` written into the child's profile (repeatable).
    #[arg(long = "repo", value_name = "NAME=URL", value_parser = parse_key_value)]
    pub repos: Vec<(String, String)>,

    /// Write the child's stdout to this file.
    #[arg(long, value_name = "PATH")]
    pub stdout: Option<PathBuf>,

    /// Write the child's stderr to this file (appended if same as --stdout).
    #[arg(long, value_name = "PATH")]
    pub stderr: Option<PathBuf>,

    /// Echo child output to the console while it runs.
    #[arg(long)]
    pub show: bool,

    /// Print the command line before running it.
    #[arg(long)]
    pub echo: bool,

    /// Show a spinner on stderr while waiting.
    #[arg(long)]
    pub spinner: bool,

    /// Let the child load its own system profile.
    #[arg(long)]
    pub system_profile: bool,

    /// Let the child load its own user profile.
    #[arg(long)]
    pub user_profile: bool,

    /// Extra environment variable `KEY=VALUE` for the child (repeatable).
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub env: Vec<(String, String)>,

    /// Timeout such as `30s`, `500ms`, `2m`, or `none`.
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<Timeout>,

    /// Working directory for the child.
    #[arg(long = "wd", value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Report a nonzero exit status instead of failing on it.
    #[arg(long)]
    pub no_fail_on_status: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CHILDRUN_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Print the resolved command and environment, but don't run anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{s}'")),
    }
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
