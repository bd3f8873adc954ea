//! Application configuration loaded from environment variables.

use std::str::FromStr;
use std::time::Duration;

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `LOG_FORMAT`: `json` for JSON lines, anything else for text
/// - `DATABASE_URL`: PostgreSQL event log; in-memory when unset
/// - `REDIS_URL`: Redis cache; in-memory when unset
/// - `MONGO_URI`, `MONGO_DATABASE`: MongoDB catalog; in-memory when unset
/// - `CACHE_TTL_SECS`: product snapshot lifetime (default: `1800`)
/// - `TIMELINE_PARTITION_TIMEOUT_MS`: per-day read bound (default: `2000`)
/// - `TIMELINE_DEFAULT_LIMIT`: events returned without `limit` (default: `100`)
/// - `TIMELINE_DEFAULT_DAYS`: days scanned without `start_date` (default: `7`)
/// - `TIMELINE_MAX_DAYS`: longest accepted timeline window (default: `366`)
/// - `SIDE_EFFECT_TIMEOUT_MS`: bound on counter/leaderboard updates (default: `500`)
/// - `SEED_CATALOG`: insert sample products into an empty catalog
/// - `STORE_CONNECT_RETRIES`, `STORE_CONNECT_DELAY_MS`: startup retry policy
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub log_json: bool,
    pub database_url: Option<String>,
    pub redis_url: Option<String>,
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub cache_ttl_secs: u64,
    pub partition_timeout: Duration,
    pub timeline_default_limit: usize,
    pub timeline_default_days: u32,
    pub timeline_max_days: u32,
    pub side_effect_timeout: Duration,
    pub seed_catalog: bool,
    pub connect_retries: u32,
    pub connect_delay: Duration,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: non_empty("HOST").unwrap_or(defaults.host),
            port: parsed(&lookup, "PORT").unwrap_or(defaults.port),
            log_level: non_empty("RUST_LOG").unwrap_or(defaults.log_level),
            log_json: lookup("LOG_FORMAT").is_some_and(|v| v.eq_ignore_ascii_case("json")),
            database_url: non_empty("DATABASE_URL"),
            redis_url: non_empty("REDIS_URL"),
            mongo_uri: non_empty("MONGO_URI"),
            mongo_database: non_empty("MONGO_DATABASE").unwrap_or(defaults.mongo_database),
            cache_ttl_secs: parsed(&lookup, "CACHE_TTL_SECS").unwrap_or(defaults.cache_ttl_secs),
            partition_timeout: millis(parsed(&lookup, "TIMELINE_PARTITION_TIMEOUT_MS"))
                .unwrap_or(defaults.partition_timeout),
            timeline_default_limit: parsed(&lookup, "TIMELINE_DEFAULT_LIMIT")
                .unwrap_or(defaults.timeline_default_limit),
            timeline_default_days: parsed(&lookup, "TIMELINE_DEFAULT_DAYS")
                .unwrap_or(defaults.timeline_default_days),
            timeline_max_days: parsed(&lookup, "TIMELINE_MAX_DAYS")
                .unwrap_or(defaults.timeline_max_days),
            side_effect_timeout: millis(parsed(&lookup, "SIDE_EFFECT_TIMEOUT_MS"))
                .unwrap_or(defaults.side_effect_timeout),
            seed_catalog: lookup("SEED_CATALOG").is_some_and(|v| flag(&v)),
            connect_retries: parsed(&lookup, "STORE_CONNECT_RETRIES")
                .unwrap_or(defaults.connect_retries),
            connect_delay: millis(parsed(&lookup, "STORE_CONNECT_DELAY_MS"))
                .unwrap_or(defaults.connect_delay),
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|v| v.trim().parse().ok())
}

fn millis(value: Option<u64>) -> Option<Duration> {
    value.map(Duration::from_millis)
}

fn flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            log_json: false,
            database_url: None,
            redis_url: None,
            mongo_uri: None,
            mongo_database: "ecom_db".to_string(),
            cache_ttl_secs: 1800,
            partition_timeout: Duration::from_millis(2000),
            timeline_default_limit: 100,
            timeline_default_days: 7,
            timeline_max_days: 366,
            side_effect_timeout: Duration::from_millis(500),
            seed_catalog: false,
            connect_retries: 20,
            connect_delay: Duration::from_millis(2000),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(pairs: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_default_values() {
        let config = Config::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.log_level, "info");
        assert_eq!(config.cache_ttl_secs, 1800);
        assert_eq!(config.timeline_default_limit, 100);
        assert_eq!(config.timeline_default_days, 7);
        assert_eq!(config.timeline_max_days, 366);
        assert_eq!(config.mongo_database, "ecom_db");
        assert!(!config.seed_catalog);
    }

    #[test]
    fn empty_environment_gives_defaults() {
        let config = config_from(&[]);
        assert_eq!(config.addr(), Config::default().addr());
        assert!(config.database_url.is_none());
        assert!(config.redis_url.is_none());
        assert!(config.mongo_uri.is_none());
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = config_from(&[
            ("PORT", "8080"),
            ("LOG_FORMAT", "JSON"),
            ("REDIS_URL", "redis://cache:6379"),
            ("CACHE_TTL_SECS", "60"),
            ("TIMELINE_PARTITION_TIMEOUT_MS", "250"),
            ("TIMELINE_MAX_DAYS", "31"),
            ("SEED_CATALOG", "true"),
        ]);
        assert_eq!(config.port, 8080);
        assert!(config.log_json);
        assert_eq!(config.redis_url.as_deref(), Some("redis://cache:6379"));
        assert_eq!(config.cache_ttl_secs, 60);
        assert_eq!(config.partition_timeout, Duration::from_millis(250));
        assert_eq!(config.timeline_max_days, 31);
        assert!(config.seed_catalog);
    }

    #[test]
    fn unparsable_values_fall_back() {
        let config = config_from(&[("PORT", "eighty"), ("DATABASE_URL", "  ")]);
        assert_eq!(config.port, 3000);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn test_addr_formatting() {
        let config = Config {
            host: "127.0.0.1".to_string(),
            port: 8080,
            ..Config::default()
        };
        assert_eq!(config.addr(), "127.0.0.1:8080");
    }
}
