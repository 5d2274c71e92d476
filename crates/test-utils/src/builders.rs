#![allow(dead_code)]

use std::collections::BTreeMap;

use childrun::config::{ConfigFile, DefaultsSection, RawConfigFile};
use childrun::exec::RuntimeVars;
use childrun::types::{ProcessOutcome, TIMEOUT_STATUS};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile {
                defaults: DefaultsSection::default(),
                env: BTreeMap::new(),
                runtime: RuntimeVars::default(),
            },
        }
    }

    pub fn libpath(mut self, path: &str) -> Self {
        self.config.defaults.libpath.push(path.to_string());
        self
    }

    pub fn repo(mut self, name: &str, url: &str) -> Self {
        self.config
            .defaults
            .repos
            .insert(name.to_string(), url.to_string());
        self
    }

    pub fn timeout(mut self, timeout: &str) -> Self {
        self.config.defaults.timeout = Some(timeout.to_string());
        self
    }

    pub fn fail_on_status(mut self, val: bool) -> Self {
        self.config.defaults.fail_on_status = val;
        self
    }

    pub fn cmdarg(mut self, arg: &str) -> Self {
        self.config.defaults.cmdargs.push(arg.to_string());
        self
    }

    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.config.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn runtime(mut self, runtime: RuntimeVars) -> Self {
        self.config.runtime = runtime;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `ProcessOutcome`.
#[derive(Default)]
pub struct OutcomeBuilder {
    outcome: ProcessOutcome,
}

impl OutcomeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stdout(mut self, text: &str) -> Self {
        self.outcome.stdout = text.to_string();
        self
    }

    pub fn stderr(mut self, text: &str) -> Self {
        self.outcome.stderr = text.to_string();
        self
    }

    pub fn status(mut self, status: i32) -> Self {
        self.outcome.status = status;
        self
    }

    pub fn timed_out(self) -> Self {
        self.status(TIMEOUT_STATUS)
    }

    pub fn build(self) -> ProcessOutcome {
        self.outcome
    }
}
