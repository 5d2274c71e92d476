// src/config/model.rs

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::exec::env::RuntimeVars;
use crate::exec::request::RepositorySetting;

/// Configuration as read from a TOML file.
///
/// ```toml
/// [defaults]
/// libpath = ["/opt/lib/site"]
/// timeout = "30s"
/// fail_on_status = true
///
/// [defaults.repos]
/// CRAN = "https://cloud.r-project.org"
///
/// [env]
/// LANG = "C.UTF-8"
///
/// [runtime]
/// library_vars = ["R_LIBS", "R_LIBS_USER", "R_LIBS_SITE"]
/// ```
///
/// All sections are optional. This is the unvalidated shape; use
/// `ConfigFile::try_from` (or [`crate::config::load_and_validate`]) to get a
/// [`ConfigFile`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub defaults: DefaultsSection,

    /// Extra environment variables for every child.
    #[serde(default)]
    pub env: BTreeMap<String, String>,

    #[serde(default)]
    pub runtime: RuntimeVars,
}

/// `[defaults]` section: request settings used unless a caller overrides
/// them.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DefaultsSection {
    pub libpath: Vec<String>,
    pub repos: RepositorySetting,

    /// `"30s"`, `"250ms"`, `"5m"`, or `"none"`.
    pub timeout: Option<String>,

    pub fail_on_status: bool,
    pub show: bool,
    pub echo: bool,
    pub spinner: bool,
    pub system_profile: bool,
    pub user_profile: bool,

    /// Arguments placed before the per-call arguments.
    pub cmdargs: Vec<String>,

    pub working_dir: Option<PathBuf>,
}

impl Default for DefaultsSection {
    fn default() -> Self {
        Self {
            libpath: Vec::new(),
            repos: RepositorySetting::new(),
            timeout: None,
            fail_on_status: true,
            show: false,
            echo: false,
            spinner: false,
            system_profile: false,
            user_profile: false,
            cmdargs: Vec::new(),
            working_dir: None,
        }
    }
}

/// Validated `[defaults]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestDefaults {
    pub libpath: Vec<String>,
    pub repos: RepositorySetting,
    pub timeout: Option<Duration>,
    pub fail_on_status: bool,
    pub show: bool,
    pub echo: bool,
    pub spinner: bool,
    pub system_profile: bool,
    pub user_profile: bool,
    pub cmdargs: Vec<String>,
    pub working_dir: Option<PathBuf>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            libpath: Vec::new(),
            repos: RepositorySetting::new(),
            timeout: None,
            fail_on_status: true,
            show: false,
            echo: false,
            spinner: false,
            system_profile: false,
            user_profile: false,
            cmdargs: Vec::new(),
            working_dir: None,
        }
    }
}

/// Validated configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub defaults: RequestDefaults,
    pub env: BTreeMap<String, String>,
    pub runtime: RuntimeVars,
}

impl ConfigFile {
    /// Assemble a config without validation; only the validator calls this.
    pub(crate) fn new_unchecked(
        defaults: RequestDefaults,
        env: BTreeMap<String, String>,
        runtime: RuntimeVars,
    ) -> Self {
        Self {
            defaults,
            env,
            runtime,
        }
    }
}
