use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use childrun::errors::{ChildrunError, Result};
use childrun::exec::stream::StreamDecoder;
use childrun::exec::{ProcessRunner, RunSpec};
use childrun::types::{ProcessOutcome, Stream, TIMEOUT_STATUS};

/// A piece of output the fake child "writes".
#[derive(Debug, Clone)]
pub struct ScriptedChunk {
    pub stream: Stream,
    pub bytes: Vec<u8>,
}

impl ScriptedChunk {
    pub fn stdout(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            stream: Stream::Stdout,
            bytes: bytes.into(),
        }
    }

    pub fn stderr(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            stream: Stream::Stderr,
            bytes: bytes.into(),
        }
    }
}

type Observer = Arc<dyn Fn(&RunSpec) + Send + Sync>;

/// A fake process runner that:
/// - records every `RunSpec` it is given
/// - replays scripted chunks through the spec's handlers, decoding them the
///   same way the real runner does
/// - finishes with a scripted status (or a timeout / spawn failure).
#[derive(Clone)]
pub struct FakeRunner {
    chunks: Vec<ScriptedChunk>,
    status: i32,
    spawn_failure: bool,
    observer: Option<Observer>,
    specs: Arc<Mutex<Vec<RunSpec>>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            chunks: Vec::new(),
            status: 0,
            spawn_failure: false,
            observer: None,
            specs: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn chunk(mut self, chunk: ScriptedChunk) -> Self {
        self.chunks.push(chunk);
        self
    }

    pub fn stdout(self, text: &str) -> Self {
        self.chunk(ScriptedChunk::stdout(text))
    }

    pub fn stderr(self, text: &str) -> Self {
        self.chunk(ScriptedChunk::stderr(text))
    }

    pub fn status(mut self, status: i32) -> Self {
        self.status = status;
        self
    }

    pub fn timed_out(self) -> Self {
        self.status(TIMEOUT_STATUS)
    }

    /// Fail as if the program could not be started.
    pub fn spawn_failure(mut self) -> Self {
        self.spawn_failure = true;
        self
    }

    /// Run `f` with the spec while the "child" is running.
    pub fn observe<F>(mut self, f: F) -> Self
    where
        F: Fn(&RunSpec) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(f));
        self
    }

    pub fn specs(&self) -> Vec<RunSpec> {
        self.specs.lock().unwrap().clone()
    }

    fn replay(&self, spec: &RunSpec) -> ProcessOutcome {
        let split_lines = spec.handlers.line.is_some();
        let mut stdout = StreamDecoder::new(split_lines);
        let mut stderr = StreamDecoder::new(split_lines);
        let mut outcome = ProcessOutcome {
            status: self.status,
            ..ProcessOutcome::default()
        };

        for chunk in &self.chunks {
            let decoder = match chunk.stream {
                Stream::Stdout => &mut stdout,
                Stream::Stderr => &mut stderr,
            };
            let decoded = decoder.push(&chunk.bytes);
            deliver(spec, chunk.stream, decoded, &mut outcome);
        }

        deliver(spec, Stream::Stdout, stdout.finish(), &mut outcome);
        deliver(spec, Stream::Stderr, stderr.finish(), &mut outcome);
        outcome
    }
}

fn deliver(
    spec: &RunSpec,
    stream: Stream,
    decoded: childrun::exec::stream::Decoded,
    outcome: &mut ProcessOutcome,
) {
    if !decoded.chunk.is_empty() {
        match stream {
            Stream::Stdout => outcome.stdout.push_str(&decoded.chunk),
            Stream::Stderr => outcome.stderr.push_str(&decoded.chunk),
        }
        if let Some(block) = &spec.handlers.block {
            block(stream, &decoded.chunk);
        }
    }
    if let Some(line) = &spec.handlers.line {
        for text in &decoded.lines {
            line(stream, text);
        }
    }
}

impl Default for FakeRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessRunner for FakeRunner {
    fn run(
        &self,
        spec: RunSpec,
    ) -> Pin<Box<dyn Future<Output = Result<ProcessOutcome>> + Send + '_>> {
        Box::pin(async move {
            self.specs.lock().unwrap().push(spec.clone());

            if let Some(observer) = &self.observer {
                observer(&spec);
            }

            if self.spawn_failure {
                return Err(ChildrunError::Spawn {
                    program: spec.program.display().to_string(),
                    source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such program"),
                });
            }

            Ok(self.replay(&spec))
        })
    }
}
