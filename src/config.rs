use std::net::SocketAddr;
use std::path::PathBuf;

use thiserror::Error;

/// Application-level constants
pub const APP_NAME: &str = "HMS";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;
/// One year.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 366;
const DB_FILE_NAME: &str = "hms.db";

/// Default tracing filter, overridden by `RUST_LOG`.
pub fn default_log_filter() -> &'static str {
    "hms=info,tower_http=info"
}

/// Per-user data directory (`<data dir>/HMS`), falling back to the
/// working directory when the platform reports none.
pub fn app_data_dir() -> PathBuf {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

/// Runtime settings, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub addr: SocketAddr,
    pub db_path: PathBuf,
    /// Allowed CORS origin. `None` allows any origin.
    pub frontend_url: Option<String>,
    pub token_ttl_hours: i64,
}

impl AppConfig {
    /// Load `.env` if present, then read `HMS_*` variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                tracing::warn!("Ignoring unreadable .env file: {e}");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let raw_addr = get("HMS_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr = raw_addr.trim().parse().map_err(|_| ConfigError::Invalid {
            key: "HMS_ADDR",
            value: raw_addr.clone(),
        })?;

        let db_path = get("HMS_DB_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|| app_data_dir().join(DB_FILE_NAME));

        let token_ttl_hours = match get("HMS_TOKEN_TTL_HOURS") {
            None => DEFAULT_TOKEN_TTL_HOURS,
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(hours) if (1..=MAX_TOKEN_TTL_HOURS).contains(&hours) => hours,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "HMS_TOKEN_TTL_HOURS",
                        value: raw,
                    })
                }
            },
        };

        Ok(Self {
            addr,
            db_path,
            frontend_url: get("HMS_FRONTEND_URL").map(|v| v.trim().to_string()),
            token_ttl_hours,
        })
    }
}
