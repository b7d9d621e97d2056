use std::{fmt, net::SocketAddr, str::FromStr, time::Duration};

use anyhow::{anyhow, Context};
use goalpost_core::constants::{DEFAULT_DEDUP_CAPACITY, DEFAULT_DEDUP_TTL_SECS};

pub const DEFAULT_PROTECTED_PATHS: &str = "/api/v1/goal,/admin,/overlay";
pub const DEFAULT_AUTH_REALM: &str = "Protected Area";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(raw: &str) -> anyhow::Result<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown log format \"{other}\", expected text or json")),
        }
    }
}

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    pub request_timeout: Duration,
    pub static_dir: String,
    pub webhook_token: String,
    pub auth_user: String,
    pub auth_pass: String,
    pub auth_realm: String,
    pub protected_paths: Vec<String>,
    pub webhook_dedup_ttl: Duration,
    pub webhook_dedup_capacity: usize,
    pub event_bus_capacity: usize,
    pub log_format: LogFormat,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from any key lookup (the process environment in production).
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let required = |key: &str| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| anyhow!("{key} must be set"))
        };

        let listen_addr: SocketAddr = var("GP_LISTEN_ADDR", "0.0.0.0:8080")
            .parse()
            .context("Invalid GP_LISTEN_ADDR")?;
        let db_path = var("GP_DB_PATH", "./db/app.db");
        let cors_allow = split_list(&var("GP_CORS_ALLOW_ORIGINS", "*"));
        let timeout_ms: u64 = var("GP_REQUEST_TIMEOUT_MS", "30000")
            .parse()
            .context("Invalid GP_REQUEST_TIMEOUT_MS")?;
        let static_dir = var("GP_STATIC_DIR", "dist");

        let webhook_token = required("GP_WEBHOOK_TOKEN")?;
        let auth_user = required("GP_AUTH_USER")?;
        let auth_pass = required("GP_AUTH_PASS")?;
        let auth_realm = var("GP_AUTH_REALM", DEFAULT_AUTH_REALM);
        let protected_paths = split_list(&var("GP_PROTECTED_PATHS", DEFAULT_PROTECTED_PATHS));

        let dedup_ttl_secs: u64 = var(
            "GP_WEBHOOK_DEDUP_TTL_SECS",
            &DEFAULT_DEDUP_TTL_SECS.to_string(),
        )
        .parse()
        .context("Invalid GP_WEBHOOK_DEDUP_TTL_SECS")?;
        let webhook_dedup_capacity: usize = var(
            "GP_WEBHOOK_DEDUP_CAPACITY",
            &DEFAULT_DEDUP_CAPACITY.to_string(),
        )
        .parse()
        .context("Invalid GP_WEBHOOK_DEDUP_CAPACITY")?;
        let event_bus_capacity: usize = var("GP_EVENT_BUS_CAPACITY", "64")
            .parse()
            .context("Invalid GP_EVENT_BUS_CAPACITY")?;
        if event_bus_capacity == 0 {
            return Err(anyhow!("GP_EVENT_BUS_CAPACITY must be greater than zero"));
        }
        let log_format: LogFormat = var("GP_LOG_FORMAT", "text")
            .parse()
            .context("Invalid GP_LOG_FORMAT")?;

        Ok(Self {
            listen_addr,
            db_path,
            cors_allow,
            request_timeout: Duration::from_millis(timeout_ms),
            static_dir,
            webhook_token,
            auth_user,
            auth_pass,
            auth_realm,
            protected_paths,
            webhook_dedup_ttl: Duration::from_secs(dedup_ttl_secs),
            webhook_dedup_capacity,
            event_bus_capacity,
            log_format,
        })
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("listen_addr", &self.listen_addr)
            .field("db_path", &self.db_path)
            .field("cors_allow", &self.cors_allow)
            .field("request_timeout", &self.request_timeout)
            .field("static_dir", &self.static_dir)
            .field("webhook_token", &"<redacted>")
            .field("auth_user", &self.auth_user)
            .field("auth_pass", &"<redacted>")
            .field("auth_realm", &self.auth_realm)
            .field("protected_paths", &self.protected_paths)
            .field("webhook_dedup_ttl", &self.webhook_dedup_ttl)
            .field("webhook_dedup_capacity", &self.webhook_dedup_capacity)
            .field("event_bus_capacity", &self.event_bus_capacity)
            .field("log_format", &self.log_format)
            .finish()
    }
}
