#![allow(dead_code)]

use std::sync::Arc;

use childrun::exec::{ExecutionRequest, Harness, ProcessRunner, RuntimeVars, TokioProcessRunner};
use childrun::fs::RealFileSystem;
use childrun::fs::mock::MockFileSystem;

pub use childrun_test_utils::*;

/// Harness wired to fakes: scripted runner, in-memory files, recording console.
pub fn fake_harness(
    runner: FakeRunner,
    fs: &MockFileSystem,
    console: &RecordingConsole,
) -> Harness {
    Harness::new(
        Arc::new(runner) as Arc<dyn ProcessRunner>,
        Arc::new(fs.clone()),
        Arc::new(console.clone()),
        test_vars(),
    )
}

/// Harness that spawns real processes; console output is recorded.
pub fn real_harness(console: &RecordingConsole) -> Harness {
    let console = Arc::new(console.clone());
    Harness::new(
        Arc::new(TokioProcessRunner::new(console.clone())),
        Arc::new(RealFileSystem),
        console,
        test_vars(),
    )
}

/// Runtime variable names no real host environment sets, so tests never see
/// the caller-precedence rule kick in by accident.
pub fn test_vars() -> RuntimeVars {
    RuntimeVars {
        library_vars: vec![
            "CHILDRUN_TEST_LIBS".to_string(),
            "CHILDRUN_TEST_LIBS_USER".to_string(),
            "CHILDRUN_TEST_LIBS_SITE".to_string(),
        ],
        system_profile_var: "CHILDRUN_TEST_PROFILE".to_string(),
        user_profile_var: "CHILDRUN_TEST_PROFILE_USER".to_string(),
    }
}

/// Request running `script` through `/bin/sh -c`.
pub fn sh(script: &str) -> ExecutionRequest {
    ExecutionRequest::new("/bin/sh").args(["-c", script])
}
