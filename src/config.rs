//! Server configuration from environment variables.

use std::time::Duration;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_SESSION_IDLE_HOURS: u64 = 12;
const DEFAULT_CLEANUP_INTERVAL_MINUTES: u64 = 30;

/// Settings for the `web` binary.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Sessions not touched for this long are dropped (the stored document is kept).
    pub session_idle_timeout: Duration,
    /// How often idle sessions are swept.
    pub cleanup_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            session_idle_timeout: Duration::from_secs(DEFAULT_SESSION_IDLE_HOURS * 3600),
            cleanup_interval: Duration::from_secs(DEFAULT_CLEANUP_INTERVAL_MINUTES * 60),
        }
    }
}

impl ServerConfig {
    /// Read `HOST`, `PORT`, `SESSION_IDLE_HOURS` and `CLEANUP_INTERVAL_MINUTES`.
    /// Missing or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("HOST")
            .map(|h| h.trim().to_string())
            .filter(|h| !h.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = parse_or(&lookup, "PORT", DEFAULT_PORT);
        let idle_hours = parse_or(&lookup, "SESSION_IDLE_HOURS", DEFAULT_SESSION_IDLE_HOURS);
        let cleanup_minutes = parse_or(
            &lookup,
            "CLEANUP_INTERVAL_MINUTES",
            DEFAULT_CLEANUP_INTERVAL_MINUTES,
        )
        .max(1);

        Self {
            host,
            port,
            session_idle_timeout: Duration::from_secs(idle_hours.saturating_mul(3600)),
            cleanup_interval: Duration::from_secs(cleanup_minutes.saturating_mul(60)),
        }
    }

    pub fn bind_address(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr + std::fmt::Display + Copy,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring invalid {}={:?}, using {}", key, raw, default);
            default
        }),
    }
}
