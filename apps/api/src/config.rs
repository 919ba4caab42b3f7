//! API configuration module.
//!
//! Configuration is read from environment variables (after `.env` is
//! loaded by `main`), with fallback to defaults.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// API server configuration.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// HTTP listening port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Maximum pooled database connections
    pub db_max_connections: u32,

    /// Secret key for signing bearer tokens
    pub jwt_secret: String,

    /// Bearer token lifetime in seconds
    pub jwt_lifetime_secs: i64,

    /// Supplies feed; the sync job is disabled when unset
    pub supplies_url: Option<String>,

    /// Delay between supplies syncs
    pub supplies_sync_interval: Duration,

    /// Refuse order status moves backwards in the lifecycle
    pub order_status_forward_only: bool,
}

impl ApiConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from any key lookup.
    ///
    /// `load` passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("JWT_SECRET_KEY")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("JWT_SECRET_KEY".to_string()))?;

        let config = ApiConfig {
            port: parse_or(&lookup, "PORT", 3000)?,

            database_path: lookup("DATABASE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./newworld.db")),

            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", 5)?,

            jwt_secret,

            jwt_lifetime_secs: parse_or(&lookup, "JWT_LIFETIME_SECS", 86_400)?, // 24 hours

            supplies_url: lookup("SUPPLIES_URL").filter(|s| !s.trim().is_empty()),

            supplies_sync_interval: Duration::from_secs(parse_or(
                &lookup,
                "SUPPLIES_SYNC_INTERVAL_SECS",
                3600,
            )?),

            order_status_forward_only: parse_or(&lookup, "ORDER_STATUS_FORWARD_ONLY", false)?,
        };

        if config.jwt_lifetime_secs <= 0 {
            return Err(ConfigError::InvalidValue("JWT_LIFETIME_SECS".to_string()));
        }
        if config.supplies_sync_interval.is_zero() {
            return Err(ConfigError::InvalidValue(
                "SUPPLIES_SYNC_INTERVAL_SECS".to_string(),
            ));
        }
        if config.db_max_connections == 0 {
            return Err(ConfigError::InvalidValue("DB_MAX_CONNECTIONS".to_string()));
        }

        Ok(config)
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(key.to_string())),
        None => Ok(default),
    }
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<ApiConfig, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[("JWT_SECRET_KEY", "s3cret")]).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.database_path, PathBuf::from("./newworld.db"));
        assert_eq!(config.db_max_connections, 5);
        assert_eq!(config.jwt_lifetime_secs, 86_400);
        assert_eq!(config.supplies_url, None);
        assert_eq!(config.supplies_sync_interval, Duration::from_secs(3600));
        assert!(!config.order_status_forward_only);
    }

    #[test]
    fn test_secret_is_required() {
        let err = config_from(&[]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(ref k) if k == "JWT_SECRET_KEY"));

        let err = config_from(&[("JWT_SECRET_KEY", "  ")]).unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequired(_)));
    }

    #[test]
    fn test_invalid_values_name_the_key() {
        let err = config_from(&[("JWT_SECRET_KEY", "s"), ("PORT", "eighty")]).unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for PORT");

        let err = config_from(&[("JWT_SECRET_KEY", "s"), ("SUPPLIES_SYNC_INTERVAL_SECS", "0")])
            .unwrap_err();
        assert_eq!(err.to_string(), "Invalid value for SUPPLIES_SYNC_INTERVAL_SECS");
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("JWT_SECRET_KEY", "s"),
            ("PORT", "8080"),
            ("SUPPLIES_URL", "http://supplies.local/feed"),
            ("ORDER_STATUS_FORWARD_ONLY", "true"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.supplies_url.as_deref(), Some("http://supplies.local/feed"));
        assert!(config.order_status_forward_only);
    }
}
