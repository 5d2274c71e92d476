// src/config/validate.rs

use std::sync::LazyLock;

use regex::Regex;

use crate::config::model::{ConfigFile, DefaultsSection, RawConfigFile, RequestDefaults};
use crate::errors::{ChildrunError, Result};
use crate::exec::env::RuntimeVars;
use crate::types::Timeout;

static VAR_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("variable name pattern is valid")
});

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = ChildrunError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_runtime_vars(&raw.runtime)?;
        validate_env(&raw)?;
        let defaults = validate_defaults(raw.defaults)?;
        Ok(ConfigFile::new_unchecked(defaults, raw.env, raw.runtime))
    }
}

fn validate_runtime_vars(vars: &RuntimeVars) -> Result<()> {
    if vars.library_vars.is_empty() {
        return Err(ChildrunError::ConfigError(
            "[runtime].library_vars must name at least one variable".to_string(),
        ));
    }

    let names = vars
        .library_vars
        .iter()
        .chain([&vars.system_profile_var, &vars.user_profile_var]);
    for name in names {
        if !VAR_NAME.is_match(name) {
            return Err(ChildrunError::ConfigError(format!(
                "[runtime] variable name '{}' is not a valid environment variable name",
                name
            )));
        }
    }
    Ok(())
}

fn validate_env(cfg: &RawConfigFile) -> Result<()> {
    for key in cfg.env.keys() {
        if key.is_empty() || key.contains('=') || key.contains('\0') {
            return Err(ChildrunError::ConfigError(format!(
                "[env] key {:?} is not a valid environment variable name",
                key
            )));
        }
    }
    for (key, value) in cfg.env.iter() {
        if value.contains('\0') {
            return Err(ChildrunError::ConfigError(format!(
                "[env].{} contains a NUL byte",
                key
            )));
        }
    }
    Ok(())
}

fn validate_defaults(raw: DefaultsSection) -> Result<RequestDefaults> {
    for (name, url) in raw.repos.iter() {
        if name.trim().is_empty() {
            return Err(ChildrunError::ConfigError(
                "[defaults.repos] contains an empty repository name".to_string(),
            ));
        }
        if name.contains('\0') || url.contains('\0') {
            return Err(ChildrunError::ConfigError(format!(
                "[defaults.repos].{} contains a NUL byte",
                name
            )));
        }
    }

    let timeout = match raw.timeout.as_deref() {
        Some(s) => {
            s.parse::<Timeout>()
                .map_err(|e| ChildrunError::ConfigError(format!("[defaults].timeout: {e}")))?
                .0
        }
        None => None,
    };

    Ok(RequestDefaults {
        libpath: raw.libpath,
        repos: raw.repos,
        timeout,
        fail_on_status: raw.fail_on_status,
        show: raw.show,
        echo: raw.echo,
        spinner: raw.spinner,
        system_profile: raw.system_profile,
        user_profile: raw.user_profile,
        cmdargs: raw.cmdargs,
        working_dir: raw.working_dir,
    })
}
