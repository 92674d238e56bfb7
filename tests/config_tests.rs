use std::time::Duration;

use fmcd_dashboard::config::{ClientConfig, Config, BOOTSTRAP_TEAM_ID, BOOTSTRAP_USER_ID};
use fmcd_dashboard::teams::TeamRole;
use tempfile::tempdir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.http_bind_port, 7071);
    assert_eq!(config.store_path.to_str(), Some("teams.json"));
    assert_eq!(config.client, ClientConfig::default());
    assert!(config.users.is_empty());
}

#[test]
fn test_default_retry_policy() {
    let policy = ClientConfig::default().retry_policy();
    assert_eq!(policy.max_attempts, 3);
    assert_eq!(policy.base_timeout, Duration::from_millis(10_000));
    assert_eq!(policy.timeout_step, Duration::from_millis(5_000));
    assert_eq!(policy.base_delay, Duration::from_millis(1_000));
}

#[test]
fn test_config_parses_kebab_case_toml() {
    let config: Config = toml::from_str(
        r#"
http-bind-ip = "0.0.0.0"
http-bind-port = 8080
store-path = "/var/lib/dashboard/teams.json"

[client]
max-retries = 5
base-timeout-ms = 2000

[[users]]
id = "alice"
token = "alice-token"

[users.teams]
ops = "admin"
sales = "viewer"
"#,
    )
    .unwrap();

    assert_eq!(config.http_address(), "0.0.0.0:8080");
    assert_eq!(config.client.max_retries, 5);
    assert_eq!(config.client.base_timeout_ms, 2000);
    assert_eq!(config.client.timeout_step_ms, 5000);
    assert_eq!(config.users.len(), 1);
    assert_eq!(config.users[0].teams["ops"], TeamRole::Admin);
    assert_eq!(config.users[0].teams["sales"], TeamRole::Viewer);
}

#[test]
fn test_store_path_resolution() {
    let data_dir = std::path::Path::new("/data");

    let config = Config::default();
    assert_eq!(
        config.resolved_store_path(data_dir),
        data_dir.join("teams.json")
    );

    let mut absolute = Config::default();
    absolute.store_path = "/srv/teams.json".into();
    assert_eq!(
        absolute.resolved_store_path(data_dir),
        std::path::PathBuf::from("/srv/teams.json")
    );
}

#[test]
fn test_config_save_load() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("test.toml");

    let mut original_config = Config::default();
    original_config.http_bind_port = 8080;
    original_config.client.max_retries = 1;

    original_config.save_to_file(&config_path).unwrap();
    let loaded_config = Config::load_from_file(&config_path).unwrap();

    assert_eq!(loaded_config.http_bind_port, 8080);
    assert_eq!(loaded_config.client.max_retries, 1);
    assert!(!dir.path().join("test.tmp").exists());
}

#[test]
fn test_generate_token() {
    let token1 = Config::generate_token();
    let token2 = Config::generate_token();

    assert_ne!(token1, token2);
    // 32 bytes, base64 without padding
    assert_eq!(token1.len(), 43);
    assert!(token1
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
}

#[test]
fn test_load_or_create_new_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("new_config.toml");

    assert!(!config_path.exists());

    let (config, user_generated) = Config::load_or_create(&config_path).unwrap();

    assert!(config_path.exists());
    assert!(user_generated);
    assert_eq!(config.users.len(), 1);
    assert_eq!(config.users[0].id, BOOTSTRAP_USER_ID);
    assert_eq!(config.users[0].teams[BOOTSTRAP_TEAM_ID], TeamRole::Admin);

    // The generated token survives a reload
    let reloaded = Config::load_from_file(&config_path).unwrap();
    assert_eq!(reloaded.users[0].token, config.users[0].token);
}

#[test]
fn test_load_or_create_existing_users() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("existing_config.toml");

    let (first, _) = Config::load_or_create(&config_path).unwrap();
    let (second, user_generated) = Config::load_or_create(&config_path).unwrap();

    assert!(!user_generated);
    assert_eq!(second.users, first.users);
}

#[test]
fn test_load_or_create_keeps_malformed_file() {
    let dir = tempdir().unwrap();
    let config_path = dir.path().join("malformed.toml");
    let contents = r#"
http-bind-port = 7071x

[[users]]
id = "alice"
token = "alice-token"
"#;
    std::fs::write(&config_path, contents).unwrap();

    let err = Config::load_or_create(&config_path).unwrap_err();

    assert!(err.to_string().contains("Failed to load config file"));
    assert_eq!(std::fs::read_to_string(&config_path).unwrap(), contents);
}
