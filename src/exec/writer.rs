// src/exec/writer.rs

use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::errors::Result;
use crate::fs::FileSystem;
use crate::types::ProcessOutcome;

/// Persist captured output to the requested files.
///
/// Each destination is truncated, except when `stderr` names the same file
/// as `stdout` (compared after canonicalisation, so `./out.txt` and
/// `out.txt` match): then stderr is appended after stdout. A missing
/// destination discards that stream.
pub fn write_outputs(
    fs: &dyn FileSystem,
    outcome: &ProcessOutcome,
    stdout: Option<&Path>,
    stderr: Option<&Path>,
) -> Result<()> {
    if let Some(path) = stdout {
        fs.write(path, outcome.stdout.as_bytes())?;
        debug!(path = %path.display(), bytes = outcome.stdout.len(), "wrote child stdout");
    }

    if let Some(path) = stderr {
        if stdout.is_some_and(|out| same_file(fs, out, path)) {
            fs.append(path, outcome.stderr.as_bytes())
                .with_context(|| format!("appending stderr to stdout file {:?}", path))?;
            debug!(path = %path.display(), bytes = outcome.stderr.len(), "appended child stderr to stdout file");
        } else {
            fs.write(path, outcome.stderr.as_bytes())?;
            debug!(path = %path.display(), bytes = outcome.stderr.len(), "wrote child stderr");
        }
    }

    Ok(())
}

fn same_file(fs: &dyn FileSystem, a: &Path, b: &Path) -> bool {
    if !fs.exists(b) {
        return false;
    }
    match (fs.canonicalize(a), fs.canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
