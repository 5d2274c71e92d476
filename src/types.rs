// src/types.rs

//! Small value types shared across the harness.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Status recorded in a [`ProcessOutcome`] when the child was killed because
/// it exceeded its timeout.
///
/// Normal exits are `>= 0`; signal terminations are small negative numbers,
/// so `i32::MIN` cannot collide with either.
pub const TIMEOUT_STATUS: i32 = i32::MIN;

/// Which output stream of the child a piece of text came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stream {
    Stdout,
    Stderr,
}

impl fmt::Display for Stream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stream::Stdout => f.write_str("stdout"),
            Stream::Stderr => f.write_str("stderr"),
        }
    }
}

/// Everything observed from one supervised child run.
///
/// Produced once by a [`crate::exec::ProcessRunner`] and never mutated
/// afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutcome {
    pub stdout: String,
    pub stderr: String,
    pub status: i32,
}

impl ProcessOutcome {
    pub fn timed_out(&self) -> bool {
        self.status == TIMEOUT_STATUS
    }

    pub fn success(&self) -> bool {
        self.status == 0
    }
}

/// Timeout as written in config files and on the command line.
///
/// `"none"` (or `"inf"`, `"0"`) means the child may run forever; anything
/// else goes through [`parse_duration`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Timeout(pub Option<Duration>);

impl FromStr for Timeout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "none" | "inf" | "0" => Ok(Timeout(None)),
            other => parse_duration(other).map(|d| Timeout(Some(d))),
        }
    }
}

/// Parse a simple duration string like `"3s"`, `"250ms"`, `"1m"`, `"2h"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty duration string".to_string());
    }

    // Find the boundary between digits and suffix.
    let idx = s
        .chars()
        .position(|c| !c.is_ascii_digit())
        .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;

    let (num_part, unit_part) = s.split_at(idx);
    let value: u64 = num_part
        .parse()
        .map_err(|e| format!("invalid duration number '{}': {}", num_part, e))?;
    let unit = unit_part.trim().to_lowercase();

    let secs_per_unit = match unit.as_str() {
        "ms" => return Ok(Duration::from_millis(value)),
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        _ => {
            return Err(format!(
                "unsupported duration unit '{}'; expected ms, s, m, or h",
                unit
            ));
        }
    };

    value
        .checked_mul(secs_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{s}' is too large"))
}
