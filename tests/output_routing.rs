use std::sync::Arc;

use childrun::exec::{OutputCallback, build_handlers};
use childrun::types::Stream;
use childrun_test_utils::{ConsoleEvent, RecordingConsole};

fn recording_callback(console: &RecordingConsole) -> OutputCallback {
    Arc::new(console.callback())
}

#[test]
fn test_show_without_callback_writes_to_console() {
    let console = RecordingConsole::new();
    let handlers = build_handlers(true, None, None, Arc::new(console.clone()));

    let block = handlers.block.expect("block handler");
    block(Stream::Stdout, "hello\n");
    block(Stream::Stderr, "oops");

    assert_eq!(
        console.events(),
        vec![
            ConsoleEvent::Console(Stream::Stdout, "hello\n".to_string()),
            ConsoleEvent::Console(Stream::Stderr, "oops".to_string()),
        ]
    );
    assert!(handlers.line.is_none());
}

#[test]
fn test_show_with_callback_writes_console_then_callback() {
    let console = RecordingConsole::new();
    let handlers = build_handlers(
        true,
        None,
        Some(recording_callback(&console)),
        Arc::new(console.clone()),
    );

    let block = handlers.block.expect("block handler");
    block(Stream::Stdout, "chunk");

    assert_eq!(
        console.events(),
        vec![
            ConsoleEvent::Console(Stream::Stdout, "chunk".to_string()),
            ConsoleEvent::Callback(Stream::Stdout, "chunk".to_string()),
        ]
    );
}

#[test]
fn test_hidden_without_callback_has_no_handlers() {
    let console = RecordingConsole::new();
    let handlers = build_handlers(false, None, None, Arc::new(console.clone()));

    assert!(handlers.block.is_none());
    assert!(handlers.line.is_none());
    assert!(handlers.is_empty());
}

#[test]
fn test_hidden_with_callback_only_calls_callback() {
    let console = RecordingConsole::new();
    let handlers = build_handlers(
        false,
        None,
        Some(recording_callback(&console)),
        Arc::new(console.clone()),
    );

    let block = handlers.block.expect("block handler");
    block(Stream::Stderr, "warning");

    assert_eq!(
        console.events(),
        vec![ConsoleEvent::Callback(Stream::Stderr, "warning".to_string())]
    );
}

#[test]
fn test_line_handler_is_independent_of_show() {
    for show in [true, false] {
        let console = RecordingConsole::new();
        let handlers = build_handlers(
            show,
            Some(recording_callback(&console)),
            None,
            Arc::new(console.clone()),
        );

        let line = handlers.line.expect("line handler");
        line(Stream::Stdout, "a line");

        assert_eq!(console.callback_texts(), vec!["a line".to_string()]);
        assert_eq!(handlers.block.is_some(), show);
    }
}
