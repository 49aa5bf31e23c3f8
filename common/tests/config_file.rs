#![allow(clippy::unwrap_used, clippy::expect_used)]

use pretty_assertions::assert_eq;
use station_common::{ConfigError, ConfigLoader};
use tempfile::TempDir;

fn home_with(contents: &str) -> TempDir {
    let home = TempDir::new().unwrap();
    std::fs::write(home.path().join("config.toml"), contents).unwrap();
    home
}

#[test]
fn file_layer_sits_between_defaults_and_env() {
    let home = home_with(
        r#"
        token = "from-file"
        stale_time_secs = 10
        dashboard_url = "https://dash.example.com"
        "#,
    );

    let config = ConfigLoader::new()
        .with_home(home.path())
        .with_env_vars([("STATION_STALE_TIME_SECS", "20")])
        .load()
        .unwrap();

    assert_eq!(config.token.as_deref(), Some("from-file"));
    assert_eq!(config.stale_time_secs, 20);
    assert_eq!(config.dashboard_url, "https://dash.example.com");
    assert_eq!(config.redirect_delay_secs, 3);
}

#[test]
fn missing_default_file_falls_back_to_defaults() {
    let home = TempDir::new().unwrap();

    let config = ConfigLoader::new()
        .with_home(home.path())
        .skip_env_layer()
        .load()
        .unwrap();

    assert_eq!(config.bind, "127.0.0.1:3000");
}

#[test]
fn home_can_come_from_the_environment() {
    let home = home_with("bind = \"0.0.0.0:8080\"\n");

    let config = ConfigLoader::new()
        .with_env_vars([("STATION_HOME", home.path().to_str().unwrap())])
        .load()
        .unwrap();

    assert_eq!(config.bind, "0.0.0.0:8080");
}

#[test]
fn explicit_config_file_must_exist() {
    let home = TempDir::new().unwrap();

    let err = ConfigLoader::new()
        .with_config_file(home.path().join("missing.toml"))
        .skip_env_layer()
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn malformed_file_reports_its_path() {
    let home = home_with("stale_time_secs = \"sixty\"\n");

    let err = ConfigLoader::new()
        .with_home(home.path())
        .skip_env_layer()
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn invalid_endpoint_is_rejected() {
    let home = home_with("endpoint = \"not a url\"\n");

    let err = ConfigLoader::new()
        .with_home(home.path())
        .skip_env_layer()
        .load()
        .unwrap_err();

    assert!(matches!(err, ConfigError::Invalid { field: "endpoint", .. }));
}
