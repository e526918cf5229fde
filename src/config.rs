//! Configuration Module
//!
//! Loads service configuration from environment variables. Problems are
//! reported as [`ConfigError`] so the process can refuse to start.

use std::env;
use std::fmt::Display;
use std::str::FromStr;
use std::time::Duration;

use crate::bus::DEFAULT_CHANNEL;
use crate::error::ConfigError;

/// Service configuration parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Maximum number of entries the cache can hold
    pub capacity: usize,
    /// Default TTL in seconds for entries set without one
    pub default_ttl: u64,
    /// Messaging endpoint for the invalidation bus
    pub redis_url: String,
    /// Invalidation channel name, shared fleet-wide
    pub channel: String,
    /// SQLite database path
    pub database_path: String,
    /// HTTP server port
    pub server_port: u16,
    /// Seconds between optional expiry sweeps, 0 = disabled
    pub sweep_interval: u64,
}

impl Config {
    /// Creates a Config from the process environment.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 256)
    /// - `CACHE_TTL_SECONDS` - Default TTL in seconds (default: 20)
    /// - `REDIS_URL` - Messaging endpoint (required)
    /// - `INVALIDATION_CHANNEL` - Channel name (default: cache.invalidate)
    /// - `DATABASE_PATH` - SQLite path (default: :memory:)
    /// - `SERVER_PORT` - HTTP server port (default: 8000)
    /// - `CACHE_SWEEP_INTERVAL` - Sweep frequency in seconds (default: 0, off)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Creates a Config reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let capacity: usize = parse_var(&lookup, "CACHE_CAPACITY", 256)?;
        if capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }

        let default_ttl: u64 = parse_var(&lookup, "CACHE_TTL_SECONDS", 20)?;
        if default_ttl == 0 {
            return Err(ConfigError::Invalid {
                var: "CACHE_TTL_SECONDS".to_string(),
                value: "0".to_string(),
                reason: "default TTL must be positive".to_string(),
            });
        }

        let redis_url = lookup("REDIS_URL")
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::Missing("REDIS_URL".to_string()))?;

        Ok(Self {
            capacity,
            default_ttl,
            redis_url,
            channel: lookup("INVALIDATION_CHANNEL").unwrap_or_else(|| DEFAULT_CHANNEL.to_string()),
            database_path: lookup("DATABASE_PATH").unwrap_or_else(|| ":memory:".to_string()),
            server_port: parse_var(&lookup, "SERVER_PORT", 8000)?,
            sweep_interval: parse_var(&lookup, "CACHE_SWEEP_INTERVAL", 0)?,
        })
    }

    pub fn default_ttl_duration(&self) -> Duration {
        Duration::from_secs(self.default_ttl)
    }
}

/// Parses `var` if set; a present but unparseable value is an error.
fn parse_var<T, F>(lookup: &F, var: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var: var.to_string(),
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_config_defaults() {
        let config = load(&[("REDIS_URL", "redis://localhost:6379")]).unwrap();
        assert_eq!(config.capacity, 256);
        assert_eq!(config.default_ttl, 20);
        assert_eq!(config.channel, "cache.invalidate");
        assert_eq!(config.database_path, ":memory:");
        assert_eq!(config.server_port, 8000);
        assert_eq!(config.sweep_interval, 0);
        assert_eq!(config.default_ttl_duration(), Duration::from_secs(20));
    }

    #[test]
    fn test_config_overrides() {
        let config = load(&[
            ("REDIS_URL", "redis://cache:6379"),
            ("CACHE_CAPACITY", "200"),
            ("CACHE_TTL_SECONDS", "30"),
            ("INVALIDATION_CHANNEL", "inv.products"),
            ("SERVER_PORT", "9000"),
            ("CACHE_SWEEP_INTERVAL", "5"),
        ])
        .unwrap();
        assert_eq!(config.capacity, 200);
        assert_eq!(config.default_ttl, 30);
        assert_eq!(config.channel, "inv.products");
        assert_eq!(config.server_port, 9000);
        assert_eq!(config.sweep_interval, 5);
    }

    #[test]
    fn test_missing_redis_url_is_fatal() {
        assert_eq!(load(&[]), Err(ConfigError::Missing("REDIS_URL".to_string())));
        assert_eq!(
            load(&[("REDIS_URL", "  ")]),
            Err(ConfigError::Missing("REDIS_URL".to_string()))
        );
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let result = load(&[("REDIS_URL", "redis://x"), ("CACHE_CAPACITY", "0")]);
        assert_eq!(result, Err(ConfigError::ZeroCapacity));
    }

    #[test]
    fn test_unparseable_values_rejected() {
        for (var, value) in [
            ("CACHE_CAPACITY", "abc"),
            ("CACHE_CAPACITY", "-5"),
            ("CACHE_TTL_SECONDS", "1.5"),
            ("CACHE_TTL_SECONDS", "0"),
            ("SERVER_PORT", "70000"),
        ] {
            let result = load(&[("REDIS_URL", "redis://x"), (var, value)]);
            assert!(
                matches!(result, Err(ConfigError::Invalid { .. })),
                "{var}={value} should be rejected, got {result:?}"
            );
        }
    }
}
