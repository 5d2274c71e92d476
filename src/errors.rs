// src/errors.rs

//! Crate-wide error type.
//!
//! The process-level variants (`Timeout`, `NonzeroStatus`, `OutputWrite`)
//! always carry the full captured output, so callers can diagnose a failure
//! without re-running the child.

use std::time::Duration;

use thiserror::Error;

use crate::types::ProcessOutcome;

#[derive(Error, Debug)]
pub enum ChildrunError {
    #[error("child process timed out after {timeout:?}")]
    Timeout {
        timeout: Duration,
        outcome: ProcessOutcome,
    },

    #[error("child process exited with status {}", .outcome.status)]
    NonzeroStatus { outcome: ProcessOutcome },

    #[error("failed to write child output: {reason}")]
    OutputWrite {
        reason: String,
        outcome: ProcessOutcome,
    },

    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ChildrunError {
    /// Captured output of the child, for the process-level variants.
    pub fn outcome(&self) -> Option<&ProcessOutcome> {
        match self {
            ChildrunError::Timeout { outcome, .. }
            | ChildrunError::NonzeroStatus { outcome }
            | ChildrunError::OutputWrite { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn into_outcome(self) -> Option<ProcessOutcome> {
        match self {
            ChildrunError::Timeout { outcome, .. }
            | ChildrunError::NonzeroStatus { outcome }
            | ChildrunError::OutputWrite { outcome, .. } => Some(outcome),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, ChildrunError::Timeout { .. })
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, ChildrunError>;
