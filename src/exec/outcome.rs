// src/exec/outcome.rs

use std::time::Duration;

use tracing::{debug, warn};

use crate::errors::{ChildrunError, Result};
use crate::types::ProcessOutcome;

/// Classify a finished run.
///
/// - timed out: always an error, whatever `fail_on_status` says
/// - nonzero status with `fail_on_status`: error
/// - anything else: the outcome itself, nonzero status included
pub fn translate_outcome(
    outcome: ProcessOutcome,
    fail_on_status: bool,
    timeout: Option<Duration>,
) -> Result<ProcessOutcome> {
    if outcome.timed_out() {
        warn!(timeout_ms = ?timeout.map(|t| t.as_millis()), "child run timed out");
        return Err(ChildrunError::Timeout {
            timeout: timeout.unwrap_or_default(),
            outcome,
        });
    }

    if outcome.status != 0 && fail_on_status {
        warn!(status = outcome.status, "child exited with nonzero status");
        return Err(ChildrunError::NonzeroStatus { outcome });
    }

    debug!(status = outcome.status, "child run accepted");
    Ok(outcome)
}
