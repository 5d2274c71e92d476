// src/exec/profile.rs

//! Transient startup profile for the child runtime.
//!
//! Each call writes one statement setting the `repos` option to its own
//! temporary file. The file lives exactly as long as the [`TransientProfile`]
//! value, and removal failures never reach the caller.

use std::fmt::Write as _;
use std::io::Write as _;
use std::path::Path;

use tempfile::TempPath;
use tracing::{debug, warn};

use crate::errors::{ChildrunError, Result};
use crate::exec::request::RepositorySetting;

#[derive(Debug)]
pub struct TransientProfile {
    path: TempPath,
}

impl TransientProfile {
    /// Write a profile that sets the repository option to `repos`.
    pub fn create(repos: &RepositorySetting) -> Result<Self> {
        let statement = render_profile(repos)?;

        let mut file = tempfile::Builder::new()
            .prefix("childrun-profile-")
            .suffix(".R")
            .tempfile()?;
        file.write_all(statement.as_bytes())?;
        file.flush()?;

        let path = file.into_temp_path();
        debug!(path = %path.display(), "created transient profile");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the profile file. Failures are logged, never returned.
    ///
    /// A profile that is dropped without `destroy` (early return, panic) is
    /// still removed by `TempPath`'s own drop, silently.
    pub fn destroy(self) {
        let shown = self.path.display().to_string();
        match self.path.close() {
            Ok(()) => debug!(path = %shown, "removed transient profile"),
            Err(e) => warn!(path = %shown, error = %e, "failed to remove transient profile"),
        }
    }
}

/// Render the single `options(repos = ...)` statement.
///
/// Names and URLs are always emitted as quoted string literals, so no value
/// can end the statement early.
pub fn render_profile(repos: &RepositorySetting) -> Result<String> {
    let mut out = String::from("options(repos = ");

    if repos.is_empty() {
        out.push_str("character(0)");
    } else {
        out.push_str("c(");
        for (i, (name, url)) in repos.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            out.push_str(&quote_literal(name)?);
            out.push_str(" = ");
            out.push_str(&quote_literal(url)?);
        }
        out.push(')');
    }

    out.push_str(")\n");
    Ok(out)
}

fn quote_literal(value: &str) -> Result<String> {
    if value.contains('\0') {
        return Err(ChildrunError::ConfigError(format!(
            "repository setting {:?} contains a NUL byte",
            value
        )));
    }

    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{{{:04x}}}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(out)
}
