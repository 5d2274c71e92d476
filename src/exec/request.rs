// src/exec/request.rs

//! The immutable description of one child run.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{ConfigFile, RequestDefaults};
use crate::types::Stream;

/// Callback invoked with text produced by the child.
///
/// Used both for line callbacks (one call per completed line, without the
/// line terminator) and block callbacks (one call per chunk as read from the
/// pipe). Called from the stream reader task, so it must be `Send + Sync`.
pub type OutputCallback = Arc<dyn Fn(Stream, &str) + Send + Sync>;

/// Ordered `name -> url` map written into the child's startup profile.
pub type RepositorySetting = BTreeMap<String, String>;

/// Everything needed to run one child process.
///
/// Built once per call and handed by value to
/// [`crate::exec::Harness::execute`].
#[derive(Clone)]
pub struct ExecutionRequest {
    pub program: PathBuf,
    pub args: Vec<String>,
    pub libpath: Vec<String>,
    pub repos: RepositorySetting,
    pub stdout: Option<PathBuf>,
    pub stderr: Option<PathBuf>,
    pub echo: bool,
    pub show: bool,
    pub line_callback: Option<OutputCallback>,
    pub block_callback: Option<OutputCallback>,
    pub spinner: bool,
    pub system_profile: bool,
    pub user_profile: bool,
    /// Extra variables for the child; these count as "set by the caller".
    pub env: BTreeMap<String, String>,
    /// `None` lets the child run forever.
    pub timeout: Option<Duration>,
    /// `None` means the host's current directory.
    pub working_dir: Option<PathBuf>,
    pub fail_on_status: bool,
}

impl ExecutionRequest {
    /// Request for `program` using built-in defaults.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self::with_defaults(program, &RequestDefaults::default(), &BTreeMap::new())
    }

    /// Request for `program` using the `[defaults]` and `[env]` sections of a
    /// config file.
    pub fn from_config(program: impl Into<PathBuf>, cfg: &ConfigFile) -> Self {
        Self::with_defaults(program, &cfg.defaults, &cfg.env)
    }

    fn with_defaults(
        program: impl Into<PathBuf>,
        defaults: &RequestDefaults,
        env: &BTreeMap<String, String>,
    ) -> Self {
        Self {
            program: program.into(),
            args: defaults.cmdargs.clone(),
            libpath: defaults.libpath.clone(),
            repos: defaults.repos.clone(),
            stdout: None,
            stderr: None,
            echo: defaults.echo,
            show: defaults.show,
            line_callback: None,
            block_callback: None,
            spinner: defaults.spinner,
            system_profile: defaults.system_profile,
            user_profile: defaults.user_profile,
            env: env.clone(),
            timeout: defaults.timeout,
            working_dir: defaults.working_dir.clone(),
            fail_on_status: defaults.fail_on_status,
        }
    }

    /// Append arguments after any default `cmdargs`.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn libpath<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.libpath = paths.into_iter().map(Into::into).collect();
        self
    }

    pub fn repo(mut self, name: impl Into<String>, url: impl Into<String>) -> Self {
        self.repos.insert(name.into(), url.into());
        self
    }

    pub fn stdout_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stdout = Some(path.into());
        self
    }

    pub fn stderr_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.stderr = Some(path.into());
        self
    }

    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    pub fn show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    pub fn spinner(mut self, spinner: bool) -> Self {
        self.spinner = spinner;
        self
    }

    pub fn on_line<F>(mut self, callback: F) -> Self
    where
        F: Fn(Stream, &str) + Send + Sync + 'static,
    {
        self.line_callback = Some(Arc::new(callback));
        self
    }

    pub fn on_block<F>(mut self, callback: F) -> Self
    where
        F: Fn(Stream, &str) + Send + Sync + 'static,
    {
        self.block_callback = Some(Arc::new(callback));
        self
    }

    pub fn system_profile(mut self, use_it: bool) -> Self {
        self.system_profile = use_it;
        self
    }

    pub fn user_profile(mut self, use_it: bool) -> Self {
        self.user_profile = use_it;
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }

    pub fn fail_on_status(mut self, fail: bool) -> Self {
        self.fail_on_status = fail;
        self
    }
}

impl fmt::Debug for ExecutionRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionRequest")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("libpath", &self.libpath)
            .field("repos", &self.repos)
            .field("stdout", &self.stdout)
            .field("stderr", &self.stderr)
            .field("echo", &self.echo)
            .field("show", &self.show)
            .field("line_callback", &self.line_callback.is_some())
            .field("block_callback", &self.block_callback.is_some())
            .field("spinner", &self.spinner)
            .field("system_profile", &self.system_profile)
            .field("user_profile", &self.user_profile)
            .field("env", &self.env)
            .field("timeout", &self.timeout)
            .field("working_dir", &self.working_dir)
            .field("fail_on_status", &self.fail_on_status)
            .finish()
    }
}
