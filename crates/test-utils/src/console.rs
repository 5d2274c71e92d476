use std::sync::{Arc, Mutex};

use childrun::exec::ConsoleSink;
use childrun::types::Stream;

/// One observed write, either to the console or to a test callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Console(Stream, String),
    Callback(Stream, String),
}

/// A `ConsoleSink` that records every write into a shared event list.
///
/// Test callbacks created with [`RecordingConsole::callback`] log into the
/// same list, so tests can assert on the relative order of console echo and
/// callback invocations.
#[derive(Debug, Clone, Default)]
pub struct RecordingConsole {
    events: Arc<Mutex<Vec<ConsoleEvent>>>,
    terminal: bool,
}

impl RecordingConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pretend to be an interactive terminal (enables the spinner).
    pub fn terminal() -> Self {
        Self {
            terminal: true,
            ..Self::default()
        }
    }

    /// Callback that records `ConsoleEvent::Callback` events.
    pub fn callback(&self) -> impl Fn(Stream, &str) + Send + Sync + 'static {
        let events = Arc::clone(&self.events);
        move |stream, text| {
            events
                .lock()
                .unwrap()
                .push(ConsoleEvent::Callback(stream, text.to_string()));
        }
    }

    pub fn events(&self) -> Vec<ConsoleEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Concatenated console text written for `stream`.
    pub fn console_text(&self, stream: Stream) -> String {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ConsoleEvent::Console(s, text) if s == stream => Some(text),
                _ => None,
            })
            .collect()
    }

    /// Texts passed to callbacks, in order.
    pub fn callback_texts(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ConsoleEvent::Callback(_, text) => Some(text),
                _ => None,
            })
            .collect()
    }
}

impl ConsoleSink for RecordingConsole {
    fn write(&self, stream: Stream, text: &str) {
        self.events
            .lock()
            .unwrap()
            .push(ConsoleEvent::Console(stream, text.to_string()));
    }

    fn is_terminal(&self) -> bool {
        self.terminal
    }
}
