use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tempfile::NamedTempFile;

use childrun::cli::CliArgs;
use childrun::config::{ConfigFile, load_and_validate, load_or_default};
use childrun::errors::ChildrunError;
use childrun::exec::ExecutionRequest;
use childrun::request_from_args;
use childrun::types::{Timeout, parse_duration};
use childrun_test_utils::ConfigFileBuilder;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{}", contents).unwrap();
    file
}

#[test]
fn test_full_config_is_loaded() {
    let file = config_file(
        r#"
[defaults]
libpath = ["/opt/lib/a", "/opt/lib/b"]
timeout = "30s"
fail_on_status = false
show = true
cmdargs = ["--no-save"]
working_dir = "work"

[defaults.repos]
CRAN = "https://cloud.r-project.org"

[env]
LANG = "C.UTF-8"

[runtime]
library_vars = ["MY_LIBS"]
system_profile_var = "MY_PROFILE"
user_profile_var = "MY_USER_PROFILE"
"#,
    );

    let cfg = load_and_validate(file.path()).unwrap();

    assert_eq!(cfg.defaults.libpath, vec!["/opt/lib/a", "/opt/lib/b"]);
    assert_eq!(cfg.defaults.timeout, Some(Duration::from_secs(30)));
    assert!(!cfg.defaults.fail_on_status);
    assert!(cfg.defaults.show);
    assert_eq!(cfg.defaults.cmdargs, vec!["--no-save"]);
    assert_eq!(cfg.defaults.working_dir, Some(PathBuf::from("work")));
    assert_eq!(
        cfg.defaults.repos.get("CRAN").map(String::as_str),
        Some("https://cloud.r-project.org")
    );
    assert_eq!(cfg.env.get("LANG").map(String::as_str), Some("C.UTF-8"));
    assert_eq!(cfg.runtime.library_vars, vec!["MY_LIBS"]);
    assert_eq!(cfg.runtime.system_profile_var, "MY_PROFILE");
}

#[test]
fn test_empty_config_uses_defaults() {
    let file = config_file("");
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg, ConfigFile::default());
    assert!(cfg.defaults.fail_on_status);
    assert_eq!(cfg.defaults.timeout, None);
    assert_eq!(cfg.runtime.library_vars.len(), 3);
}

#[test]
fn test_timeout_none_disables_timeout() {
    let file = config_file("[defaults]\ntimeout = \"none\"\n");
    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.defaults.timeout, None);
}

#[test]
fn test_invalid_timeout_returns_config_error() {
    let file = config_file("[defaults]\ntimeout = \"soon\"\n");

    match load_and_validate(file.path()) {
        Err(ChildrunError::ConfigError(msg)) => assert!(msg.contains("timeout")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_invalid_runtime_variable_name_returns_config_error() {
    let file = config_file("[runtime]\nlibrary_vars = [\"R LIBS\"]\n");

    match load_and_validate(file.path()) {
        Err(ChildrunError::ConfigError(msg)) => assert!(msg.contains("R LIBS")),
        Err(e) => panic!("Expected ConfigError, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_empty_library_vars_rejected() {
    let file = config_file("[runtime]\nlibrary_vars = []\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ChildrunError::ConfigError(_))
    ));
}

#[test]
fn test_bad_env_key_rejected() {
    let file = config_file("[env]\n\"A=B\" = \"x\"\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ChildrunError::ConfigError(_))
    ));
}

#[test]
fn test_malformed_toml_returns_toml_error() {
    let file = config_file("[defaults\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(ChildrunError::TomlError(_))
    ));
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let missing = PathBuf::from("/definitely/not/here/Childrun.toml");
    assert!(matches!(
        load_or_default(Some(missing.as_path())),
        Err(ChildrunError::IoError(_))
    ));
}

#[test]
fn test_request_from_config_defaults() {
    let cfg = ConfigFileBuilder::new()
        .libpath("/lib/x")
        .repo("CRAN", "https://cran.example.org")
        .timeout("2m")
        .fail_on_status(false)
        .cmdarg("--vanilla")
        .env("FOO", "bar")
        .build();

    let request = ExecutionRequest::from_config("Rscript", &cfg).args(["-e", "1"]);

    assert_eq!(request.args, vec!["--vanilla", "-e", "1"]);
    assert_eq!(request.libpath, vec!["/lib/x"]);
    assert_eq!(request.timeout, Some(Duration::from_secs(120)));
    assert!(!request.fail_on_status);
    assert_eq!(request.env.get("FOO").map(String::as_str), Some("bar"));
    assert_eq!(
        request.repos.get("CRAN").map(String::as_str),
        Some("https://cran.example.org")
    );
}

#[test]
fn test_cli_flags_override_config() {
    let cfg = ConfigFileBuilder::new()
        .libpath("/from/config")
        .timeout("10s")
        .build();

    let args = CliArgs::try_parse_from([
        "childrun",
        "--libpath",
        "/cli/one",
        "--libpath",
        "/cli/two",
        "--repo",
        "CRAN=https://mirror.example.org",
        "--env",
        "LANG=C",
        "--timeout",
        "none",
        "--stdout",
        "out.txt",
        "--stderr",
        "out.txt",
        "--no-fail-on-status",
        "--show",
        "--system-profile",
        "--wd",
        "/tmp",
        "Rscript",
        "-e",
        "cat(1)",
    ])
    .unwrap();

    let request = request_from_args(&args, &cfg);

    assert_eq!(request.program, PathBuf::from("Rscript"));
    assert_eq!(request.args, vec!["-e", "cat(1)"]);
    assert_eq!(request.libpath, vec!["/cli/one", "/cli/two"]);
    assert_eq!(request.timeout, None);
    assert!(!request.fail_on_status);
    assert!(request.show);
    assert!(request.system_profile);
    assert!(!request.user_profile);
    assert_eq!(request.stdout, Some(PathBuf::from("out.txt")));
    assert_eq!(request.stderr, Some(PathBuf::from("out.txt")));
    assert_eq!(request.working_dir, Some(PathBuf::from("/tmp")));
    assert_eq!(request.env.get("LANG").map(String::as_str), Some("C"));
    assert_eq!(
        request.repos.get("CRAN").map(String::as_str),
        Some("https://mirror.example.org")
    );
}

#[test]
fn test_cli_rejects_malformed_key_value() {
    assert!(CliArgs::try_parse_from(["childrun", "--env", "NOEQUALS", "prog"]).is_err());
    assert!(CliArgs::try_parse_from(["childrun", "--timeout", "5 parsecs", "prog"]).is_err());
}

#[test]
fn test_parse_duration_units() {
    assert_eq!(parse_duration("250ms").unwrap(), Duration::from_millis(250));
    assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
    assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));
    assert!(parse_duration("5").is_err());
    assert!(parse_duration("5d").is_err());
}

#[test]
fn test_parse_duration_rejects_overflow() {
    let err = parse_duration("9999999999999999h").unwrap_err();
    assert!(err.contains("too large"), "unexpected error: {err}");
    assert!(parse_duration("18446744073709551615m").is_err());
    assert!("9999999999999999h".parse::<Timeout>().is_err());
}

#[test]
fn test_oversized_config_timeout_is_config_error() {
    let file = config_file(
        r#"
[defaults]
timeout = "9999999999999999h"
"#,
    );

    match load_and_validate(file.path()) {
        Err(ChildrunError::ConfigError(msg)) => assert!(msg.contains("timeout"), "{msg}"),
        other => panic!("Expected ConfigError, got: {:?}", other),
    }
}
