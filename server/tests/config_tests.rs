use medialist_server::config::{ServerConfig, MAX_HASH_COST, MIN_HASH_COST};
use std::time::Duration;

const CONFIG_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/config/server.toml");

#[test]
fn test_load_server_config() {
    let config = ServerConfig::load_from_file(CONFIG_PATH).expect("Failed to load config");

    assert_eq!(config.http.host, "127.0.0.1");
    assert_eq!(config.http.port, 8080);
    assert!(config.http.workers > 0);
}

#[test]
fn test_session_settings() {
    let config = ServerConfig::load_from_file(CONFIG_PATH).expect("Failed to load config");

    assert_eq!(config.sessions.admin_username, "admin");
    assert_eq!(config.session_timeout(), Duration::from_secs(30 * 60));
    assert_eq!(config.sweep_interval(), Duration::from_secs(60));
}

#[test]
fn test_password_cost_within_bcrypt_bounds() {
    let config = ServerConfig::load_from_file(CONFIG_PATH).expect("Failed to load config");

    assert!(config.users.password_hash_cost >= MIN_HASH_COST);
    assert!(config.users.password_hash_cost <= MAX_HASH_COST);
}

#[test]
fn test_invalid_config_path() {
    let result = ServerConfig::load_from_file("nonexistent/config.toml");
    assert!(result.is_err());
}

#[test]
fn test_defaults_match_shipped_config() {
    let shipped = ServerConfig::load_from_file(CONFIG_PATH).expect("Failed to load config");
    let defaults = ServerConfig::default();

    assert_eq!(shipped.http.port, defaults.http.port);
    assert_eq!(shipped.sessions.timeout_minutes, defaults.sessions.timeout_minutes);
    assert_eq!(shipped.sessions.admin_username, defaults.sessions.admin_username);
}
