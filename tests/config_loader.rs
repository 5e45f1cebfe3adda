use std::fs;

use indoorview::config::{Config, ConfigError, CredentialStatus};
use tempfile::TempDir;

fn write_config(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = TempDir::new().expect("temp dir");
    let path = dir.path().join("config.toml");
    fs::write(&path, content).expect("write config");
    (dir, path)
}

#[test]
fn default_values() {
    let config = Config::default();

    assert_eq!(config.portal.url, "sim://portal");
    assert_eq!(config.portal.map_item_id, "indoor-demo");
    assert_eq!(config.positioning.table_name, "IPS_Positioning");
    assert_eq!(config.positioning.pathways_layer_name, "Pathways");
    assert_eq!(config.positioning.order_by_field, "DATE_CREATED");
    assert_eq!(config.positioning.id_field, "GlobalID");
    assert!(config.positioning.auto_start);
    assert_eq!(config.auth.password_env, "INDOORVIEW_PASSWORD");
    assert_eq!(config.auth.max_attempts, 1);
    assert_eq!(config.logging.filter, "info");
    assert!(config.validate().is_ok());
}

#[test]
fn config_path_ends_with_expected() {
    assert!(Config::config_path().ends_with("indoorview/config.toml"));
}

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().expect("temp dir");
    let config = Config::load_from(&dir.path().join("absent.toml")).expect("load");
    assert_eq!(config, Config::default());
}

#[test]
fn partial_file_keeps_other_defaults() {
    let (_dir, path) = write_config(
        r#"
[portal]
url = "https://maps.example.com/portal"
map_item_id = "8fa941"

[positioning]
auto_start = false

[auth]
username = "viewer"
"#,
    );

    let config = Config::load_from(&path).expect("load");
    assert_eq!(config.portal.url, "https://maps.example.com/portal");
    assert_eq!(config.portal.map_item_id, "8fa941");
    assert!(!config.positioning.auto_start);
    assert_eq!(config.positioning.table_name, "IPS_Positioning");
    assert_eq!(config.auth.username.as_deref(), Some("viewer"));
    assert_eq!(config.logging.filter, "info");
}

#[test]
fn malformed_toml_is_parse_error() {
    let (_dir, path) = write_config("[portal\nurl = ");
    let err = Config::load_from(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
    assert!(err.to_string().contains("config.toml"));
}

#[test]
fn empty_table_name_fails_validation() {
    let (_dir, path) = write_config(
        r#"
[positioning]
table_name = "  "
"#,
    );

    let err = Config::load_from(&path).unwrap_err();
    match err {
        ConfigError::ValidationError { message } => {
            assert!(message.contains("positioning.table_name"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn zero_attempts_fails_validation() {
    let (_dir, path) = write_config(
        r#"
[auth]
max_attempts = 0
"#,
    );

    assert!(matches!(
        Config::load_from(&path),
        Err(ConfigError::ValidationError { .. })
    ));
}

#[test]
fn inline_password_resolves_when_env_is_unset() {
    let (_dir, path) = write_config(
        r#"
[auth]
username = "viewer"
password = "secret"
password_env = "INDOORVIEW_TEST_UNSET_PASSWORD_VAR"
"#,
    );

    let config = Config::load_from(&path).expect("load");
    match config.auth.resolve_credentials() {
        CredentialStatus::Configured { username, password } => {
            assert_eq!(username, "viewer");
            assert_eq!(password.expose(), "secret");
        }
        other => panic!("expected configured credentials, got {:?}", other),
    }
}
