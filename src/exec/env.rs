// src/exec/env.rs

//! Environment resolution for the child process.
//!
//! The child inherits the caller's environment plus the request's overrides.
//! On top of that the harness fills in library-path and profile variables,
//! but only for variables the caller has not set itself (an empty value
//! still counts as "set"). Names and values are kept as `OsString`, so host
//! variables that are not valid Unicode reach the child unchanged.

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

/// Separator used when joining library paths into one variable.
pub const PATH_SEPARATOR: &str = if cfg!(windows) { ";" } else { ":" };

/// Names of the child runtime's environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RuntimeVars {
    /// Primary, user and site library-path variables.
    #[serde(default = "default_library_vars")]
    pub library_vars: Vec<String>,

    #[serde(default = "default_system_profile_var")]
    pub system_profile_var: String,

    #[serde(default = "default_user_profile_var")]
    pub user_profile_var: String,
}

fn default_library_vars() -> Vec<String> {
    vec![
        "R_LIBS".to_string(),
        "R_LIBS_USER".to_string(),
        "R_LIBS_SITE".to_string(),
    ]
}

fn default_system_profile_var() -> String {
    "R_PROFILE".to_string()
}

fn default_user_profile_var() -> String {
    "R_PROFILE_USER".to_string()
}

impl Default for RuntimeVars {
    fn default() -> Self {
        Self {
            library_vars: default_library_vars(),
            system_profile_var: default_system_profile_var(),
            user_profile_var: default_user_profile_var(),
        }
    }
}

/// The complete environment handed to the child.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedEnvironment(BTreeMap<OsString, OsString>);

impl ResolvedEnvironment {
    /// Value of `key`, if set and valid Unicode.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.get_os(key).and_then(OsStr::to_str)
    }

    pub fn get_os(&self, key: impl AsRef<OsStr>) -> Option<&OsStr> {
        self.0.get(key.as_ref()).map(OsString::as_os_str)
    }

    pub fn contains(&self, key: impl AsRef<OsStr>) -> bool {
        self.0.contains_key(key.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&OsString, &OsString)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<BTreeMap<OsString, OsString>> for ResolvedEnvironment {
    fn from(vars: BTreeMap<OsString, OsString>) -> Self {
        Self(vars)
    }
}

/// The host process environment with `overrides` applied on top.
pub fn caller_environment(overrides: &BTreeMap<String, String>) -> BTreeMap<OsString, OsString> {
    let mut env: BTreeMap<OsString, OsString> = std::env::vars_os().collect();
    env.extend(
        overrides
            .iter()
            .map(|(k, v)| (OsString::from(k), OsString::from(v))),
    );
    env
}

/// Path used for library variables when the library list is empty.
///
/// The runtime treats an empty variable as "no override", so an empty list
/// has to be spelled as a directory that does not exist.
pub fn empty_libpath_placeholder() -> PathBuf {
    std::env::temp_dir().join("childrun-empty-libpath")
}

/// Compute the child's environment.
///
/// Library variables get `libpath` joined with [`PATH_SEPARATOR`]; profile
/// variables get `profile_path` unless the matching `use_*_profile` flag asks
/// for the runtime's own profile discovery. Nothing already present in
/// `caller_env` is replaced.
pub fn resolve_environment(
    caller_env: &BTreeMap<OsString, OsString>,
    libpath: &[String],
    profile_path: &Path,
    use_system_profile: bool,
    use_user_profile: bool,
    vars: &RuntimeVars,
) -> ResolvedEnvironment {
    let mut env = caller_env.clone();

    let joined = libpath.join(PATH_SEPARATOR);
    let libs = if joined.is_empty() {
        empty_libpath_placeholder().into_os_string()
    } else {
        OsString::from(joined)
    };

    for var in &vars.library_vars {
        set_default(&mut env, var, &libs);
    }

    let profile = profile_path.as_os_str();
    if !use_system_profile {
        set_default(&mut env, &vars.system_profile_var, profile);
    }
    if !use_user_profile {
        set_default(&mut env, &vars.user_profile_var, profile);
    }

    ResolvedEnvironment(env)
}

fn set_default(env: &mut BTreeMap<OsString, OsString>, key: &str, value: &OsStr) {
    if env.contains_key(OsStr::new(key)) {
        debug!(var = %key, "keeping caller-provided value");
    } else {
        env.insert(OsString::from(key), value.to_os_string());
    }
}
