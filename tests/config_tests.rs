use iot_portal_config::{API_URL_ENV, Config, ConfigError, LogLevel};
use std::fs;
use tempfile::TempDir;

fn env_override_active() -> bool {
    std::env::var(API_URL_ENV).is_ok_and(|v| !v.trim().is_empty())
}

#[test]
fn test_config_defaults() {
    let config = Config::default();
    assert_eq!(config.api.base_url, "http://localhost:8080/api/");
    assert_eq!(config.api.timeout_secs, 30);
    assert!(config.api.headers.is_empty());
    assert_eq!(config.log_level, LogLevel::Info);
    assert_eq!(config.workspace.page_size, 20);
}

#[test]
fn test_config_save_and_load_round_trip() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let path = dir.path().join("nested").join("config.yaml");

    let mut config = Config::default().with_base_url("https://portal.example.com/api/");
    config.api.timeout_secs = 5;
    config
        .api
        .headers
        .insert("Authorization".to_string(), "Bearer abc".to_string());
    config.log_level = LogLevel::Debug;
    config.save_to(&path).expect("save creates parent directories");

    assert!(!path.with_extension("yaml.tmp").exists(), "temp file renamed away");

    let loaded = Config::load_from(&path).expect("load");
    if !env_override_active() {
        assert_eq!(loaded, config);
    }
    assert_eq!(loaded.api.headers["Authorization"], "Bearer abc");
    assert_eq!(loaded.log_level, LogLevel::Debug);
}

#[test]
fn test_partial_yaml_uses_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "log_level: trace\n").unwrap();

    let config = Config::load_from(&path).unwrap();

    assert_eq!(config.log_level, LogLevel::Trace);
    assert_eq!(config.api.timeout_secs, 30);
    assert_eq!(config.workspace.page_size, 20);
}

#[test]
fn test_malformed_yaml_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "api: [not, a, map\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();

    assert!(
        matches!(err.downcast_ref::<ConfigError>(), Some(ConfigError::Parse(_))),
        "unexpected error: {err:#}"
    );
}

#[test]
fn test_missing_file_is_an_io_error() {
    let dir = TempDir::new().unwrap();
    let err = Config::load_from(&dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(
        err.downcast_ref::<ConfigError>(),
        Some(ConfigError::Io(_))
    ));
}

#[test]
fn test_zero_timeout_fails_validation() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    fs::write(&path, "api:\n  timeout_secs: 0\n").unwrap();

    let err = Config::load_from(&path).unwrap_err();

    match err.downcast_ref::<ConfigError>() {
        Some(ConfigError::Validation(msg)) => assert!(msg.contains("timeout_secs"), "{msg}"),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_non_http_base_url_fails_validation() {
    let config = Config::default().with_base_url("ftp://files.example.com/");
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Validation(_))
    ));
}

#[test]
fn test_config_path_is_under_iot_portal_dir() {
    let path = Config::config_path();
    assert!(path.ends_with("iot-portal/config.yaml"), "{}", path.display());
}
