// src/exec/mod.rs

//! Process execution layer.
//!
//! - [`request`] describes one run ([`ExecutionRequest`]).
//! - [`profile`] writes and removes the child's transient startup profile.
//! - [`env`] computes the child's environment.
//! - [`output`] composes console echo and user callbacks into handlers.
//! - [`stream`] decodes piped bytes into text chunks and lines.
//! - [`backend`] defines the [`ProcessRunner`] boundary; [`supervisor`]
//!   implements it with `tokio::process`.
//! - [`writer`] persists captured output, [`outcome`] classifies the result.
//! - [`harness`] ties all of it together.

pub mod backend;
pub mod env;
pub mod harness;
pub mod outcome;
pub mod output;
pub mod profile;
pub mod request;
pub mod stream;
pub mod supervisor;
pub mod writer;

pub use backend::{ProcessRunner, RunSpec};
pub use env::{ResolvedEnvironment, RuntimeVars, resolve_environment};
pub use harness::Harness;
pub use outcome::translate_outcome;
pub use output::{ConsoleSink, OutputHandlers, StdConsole, build_handlers};
pub use profile::TransientProfile;
pub use request::{ExecutionRequest, OutputCallback, RepositorySetting};
pub use supervisor::TokioProcessRunner;
pub use writer::write_outputs;
