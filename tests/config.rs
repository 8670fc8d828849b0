//! Integration tests for environment-based server configuration.

use std::collections::HashMap;
use std::time::Duration;
use tcg_tournament_engine::config::ServerConfig;

fn config_from(vars: &[(&str, &str)]) -> ServerConfig {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ServerConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn missing_variables_use_defaults() {
    let config = config_from(&[]);
    assert_eq!(config, ServerConfig::default());
    assert_eq!(config.bind_address(), ("0.0.0.0", 8080));
    assert_eq!(config.session_idle_timeout, Duration::from_secs(12 * 3600));
    assert_eq!(config.cleanup_interval, Duration::from_secs(30 * 60));
}

#[test]
fn variables_override_defaults() {
    let config = config_from(&[
        ("HOST", " 127.0.0.1 "),
        ("PORT", "9000"),
        ("SESSION_IDLE_HOURS", "2"),
        ("CLEANUP_INTERVAL_MINUTES", "5"),
    ]);
    assert_eq!(config.bind_address(), ("127.0.0.1", 9000));
    assert_eq!(config.session_idle_timeout, Duration::from_secs(2 * 3600));
    assert_eq!(config.cleanup_interval, Duration::from_secs(5 * 60));
}

#[test]
fn invalid_values_fall_back() {
    let config = config_from(&[
        ("HOST", "   "),
        ("PORT", "eighty"),
        ("SESSION_IDLE_HOURS", "-1"),
        ("CLEANUP_INTERVAL_MINUTES", "0"),
    ]);
    assert_eq!(config.host, "0.0.0.0");
    assert_eq!(config.port, 8080);
    assert_eq!(config.session_idle_timeout, Duration::from_secs(12 * 3600));
    assert_eq!(config.cleanup_interval, Duration::from_secs(60));
}
