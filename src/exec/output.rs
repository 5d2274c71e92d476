// src/exec/output.rs

//! Routing of child output to the console and to user callbacks.
//!
//! [`build_handlers`] turns the request's `show` flag and optional callbacks
//! into the handlers the process runner actually calls:
//!
//! | show  | block callback | block handler                  |
//! |-------|----------------|--------------------------------|
//! | true  | none           | console                        |
//! | true  | some           | console, then callback         |
//! | false | none           | none                           |
//! | false | some           | callback                       |
//!
//! The line handler is the user's line callback, untouched by `show`.

use std::fmt::Debug;
use std::io::{IsTerminal, Write};
use std::sync::Arc;

use crate::exec::request::OutputCallback;
use crate::types::Stream;

/// Where "console" output goes.
///
/// Writes happen synchronously on the reader task that delivered the chunk.
pub trait ConsoleSink: Send + Sync + Debug {
    fn write(&self, stream: Stream, text: &str);

    /// Whether interactive decorations (the spinner) make sense.
    fn is_terminal(&self) -> bool {
        false
    }
}

/// The host's real stdout/stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdConsole;

impl ConsoleSink for StdConsole {
    fn write(&self, stream: Stream, text: &str) {
        // Console echo is best-effort: a closed terminal must not fail the run.
        match stream {
            Stream::Stdout => {
                let mut out = std::io::stdout().lock();
                let _ = out.write_all(text.as_bytes());
                let _ = out.flush();
            }
            Stream::Stderr => {
                let mut err = std::io::stderr().lock();
                let _ = err.write_all(text.as_bytes());
                let _ = err.flush();
            }
        }
    }

    fn is_terminal(&self) -> bool {
        std::io::stderr().is_terminal()
    }
}

/// Handlers handed to a [`crate::exec::ProcessRunner`].
#[derive(Clone, Default)]
pub struct OutputHandlers {
    pub line: Option<OutputCallback>,
    pub block: Option<OutputCallback>,
}

impl OutputHandlers {
    pub fn is_empty(&self) -> bool {
        self.line.is_none() && self.block.is_none()
    }
}

impl Debug for OutputHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputHandlers")
            .field("line", &self.line.is_some())
            .field("block", &self.block.is_some())
            .finish()
    }
}

pub fn build_handlers(
    show: bool,
    line_callback: Option<OutputCallback>,
    block_callback: Option<OutputCallback>,
    console: Arc<dyn ConsoleSink>,
) -> OutputHandlers {
    let block: Option<OutputCallback> = match (show, block_callback) {
        (true, None) => Some(Arc::new(move |stream: Stream, chunk: &str| {
            console.write(stream, chunk);
        })),
        (true, Some(callback)) => Some(Arc::new(move |stream: Stream, chunk: &str| {
            console.write(stream, chunk);
            callback(stream, chunk);
        })),
        (false, callback) => callback,
    };

    OutputHandlers {
        line: line_callback,
        block,
    }
}
