// src/exec/supervisor.rs

//! Production process runner built on `tokio::process`.

use std::process::Stdio;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::errors::{ChildrunError, Result};
use crate::exec::backend::{ProcessRunner, RunSpec};
use crate::exec::output::{ConsoleSink, OutputHandlers, StdConsole};
use crate::exec::stream::{Decoded, StreamDecoder};
use crate::types::{ProcessOutcome, Stream, TIMEOUT_STATUS};

const READ_CHUNK: usize = 8 * 1024;

/// How long the readers may keep draining the pipes after a timeout kill.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

const SPINNER_FRAMES: [char; 4] = ['|', '/', '-', '\\'];
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Runs the child with piped stdout/stderr, streaming both through the
/// request's handlers while waiting for exit or timeout.
#[derive(Debug, Clone)]
pub struct TokioProcessRunner {
    console: Arc<dyn ConsoleSink>,
}

impl TokioProcessRunner {
    /// `console` receives the echoed command line and the spinner.
    pub fn new(console: Arc<dyn ConsoleSink>) -> Self {
        Self { console }
    }
}

impl Default for TokioProcessRunner {
    fn default() -> Self {
        Self::new(Arc::new(StdConsole))
    }
}

impl ProcessRunner for TokioProcessRunner {
    fn run(
        &self,
        spec: RunSpec,
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<ProcessOutcome>> + Send + '_>>
    {
        Box::pin(self.run_inner(spec))
    }
}

impl TokioProcessRunner {
    async fn run_inner(&self, spec: RunSpec) -> Result<ProcessOutcome> {
        let program = spec.program.display().to_string();

        if spec.echo {
            self.console
                .write(Stream::Stdout, &format!("Running {}\n", spec.command_line()));
        }

        info!(
            program = %program,
            args = ?spec.args,
            cwd = %spec.working_dir.display(),
            timeout_ms = ?spec.timeout.map(|t| t.as_millis()),
            "starting child process"
        );

        let mut cmd = Command::new(&spec.program);
        cmd.args(&spec.args)
            .env_clear()
            .envs(spec.env.iter())
            .current_dir(&spec.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|source| ChildrunError::Spawn {
            program: program.clone(),
            source,
        })?;

        let stdout_buf = Arc::new(Mutex::new(String::new()));
        let stderr_buf = Arc::new(Mutex::new(String::new()));

        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(spawn_reader(
                stdout,
                Stream::Stdout,
                spec.handlers.clone(),
                Arc::clone(&stdout_buf),
            ));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(spawn_reader(
                stderr,
                Stream::Stderr,
                spec.handlers.clone(),
                Arc::clone(&stderr_buf),
            ));
        }

        let spinner = (spec.spinner && self.console.is_terminal())
            .then(|| spawn_spinner(Arc::clone(&self.console)));

        // One deadline covers both the exit and the pipes reaching EOF: a
        // background process that inherited them must not stretch the call.
        let deadline = spec
            .timeout
            .and_then(|limit| Instant::now().checked_add(limit));
        let waited = match deadline {
            Some(deadline) => tokio::time::timeout_at(deadline, child.wait()).await.ok(),
            None => Some(child.wait().await),
        };

        let status = match waited {
            Some(Ok(exit)) => {
                let code = exit_code(exit);
                if drain_readers(readers, deadline).await {
                    Ok(code)
                } else {
                    warn!(
                        program = %program,
                        status = code,
                        "child exited but its output pipes were still open at the timeout"
                    );
                    Ok(TIMEOUT_STATUS)
                }
            }
            Some(Err(e)) => {
                readers.iter().for_each(JoinHandle::abort);
                Err(ChildrunError::IoError(e))
            }
            None => {
                warn!(
                    program = %program,
                    timeout_ms = ?spec.timeout.map(|t| t.as_millis()),
                    "child process exceeded its timeout; killing it"
                );
                if let Err(e) = child.kill().await {
                    warn!(program = %program, error = %e, "failed to kill timed-out child");
                }
                drain_readers(readers, Some(Instant::now() + DRAIN_GRACE)).await;
                Ok(TIMEOUT_STATUS)
            }
        };

        if let Some(handle) = spinner {
            handle.abort();
            self.console.write(Stream::Stderr, "\r \r");
        }

        let status = status?;

        let outcome = ProcessOutcome {
            stdout: take_buffer(&stdout_buf),
            stderr: take_buffer(&stderr_buf),
            status,
        };

        info!(
            program = %program,
            status = outcome.status,
            timed_out = outcome.timed_out(),
            stdout_bytes = outcome.stdout.len(),
            stderr_bytes = outcome.stderr.len(),
            "child process finished"
        );

        Ok(outcome)
    }
}

fn spawn_reader<R>(
    reader: R,
    stream: Stream,
    handlers: OutputHandlers,
    captured: Arc<Mutex<String>>,
) -> JoinHandle<std::io::Result<()>>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(pump_stream(reader, stream, handlers, captured))
}

/// Read `reader` to EOF, capturing everything and feeding the handlers as
/// data arrives.
async fn pump_stream<R>(
    mut reader: R,
    stream: Stream,
    handlers: OutputHandlers,
    captured: Arc<Mutex<String>>,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
{
    let mut decoder = StreamDecoder::new(handlers.line.is_some());
    let mut buf = vec![0u8; READ_CHUNK];

    loop {
        let n = reader.read(&mut buf).await?;
        if n == 0 {
            deliver(stream, &handlers, &captured, decoder.finish());
            debug!(%stream, "stream reached EOF");
            return Ok(());
        }
        deliver(stream, &handlers, &captured, decoder.push(&buf[..n]));
    }
}

fn deliver(
    stream: Stream,
    handlers: &OutputHandlers,
    captured: &Mutex<String>,
    decoded: Decoded,
) {
    if !decoded.chunk.is_empty() {
        captured
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_str(&decoded.chunk);
        if let Some(block) = &handlers.block {
            block(stream, &decoded.chunk);
        }
    }

    if let Some(line) = &handlers.line {
        for text in &decoded.lines {
            line(stream, text);
        }
    }
}

/// Wait for every reader to reach EOF, giving up at `deadline`.
///
/// Returns `false` if any reader had to be abandoned.
async fn drain_readers(
    readers: Vec<JoinHandle<std::io::Result<()>>>,
    deadline: Option<Instant>,
) -> bool {
    let mut drained = true;
    for reader in readers {
        drained &= drain_reader(reader, deadline).await;
    }
    drained
}

async fn drain_reader(
    mut reader: JoinHandle<std::io::Result<()>>,
    deadline: Option<Instant>,
) -> bool {
    let joined = match deadline {
        Some(deadline) => match tokio::time::timeout_at(deadline, &mut reader).await {
            Ok(joined) => joined,
            Err(_) => {
                // Something else (a grandchild) still holds the pipe open.
                debug!("output reader still busy at the deadline; abandoning it");
                reader.abort();
                return false;
            }
        },
        None => reader.await,
    };

    match joined {
        Ok(Ok(())) => {}
        Ok(Err(e)) => warn!(error = %e, "error while reading child output"),
        Err(e) => warn!(error = %e, "output reader task failed"),
    }
    true
}

fn take_buffer(buf: &Mutex<String>) -> String {
    std::mem::take(&mut *buf.lock().unwrap_or_else(PoisonError::into_inner))
}

fn spawn_spinner(console: Arc<dyn ConsoleSink>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SPINNER_INTERVAL);
        for frame in SPINNER_FRAMES.iter().cycle() {
            ticker.tick().await;
            console.write(Stream::Stderr, &format!("\r{frame}"));
        }
    })
}

/// Exit code, or `-signal` for a child killed by a signal on Unix.
fn exit_code(status: std::process::ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return -signal;
        }
    }

    -1
}
