use std::{env, fmt::Display, net::SocketAddr, str::FromStr};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Server settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub log_level: String,
    pub poll_reject_after_close: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| -> Result<String, ConfigError> {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::Missing(key))
        };

        Ok(Config {
            bind_addr: parse_or(&lookup, "BIND_ADDR", "0.0.0.0:8080")?,
            database_url: required("DATABASE_URL")?,
            db_max_connections: parse_or(&lookup, "DB_MAX_CONNECTIONS", "20")?,
            jwt_secret: required("JWT_SECRET")?,
            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            poll_reject_after_close: parse_or(&lookup, "POLL_REJECT_AFTER_CLOSE", "false")?,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: &str) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: Display,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        key,
        reason: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn applies_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/clubs"),
            ("JWT_SECRET", "s3cret"),
        ]))
        .unwrap();

        assert_eq!(config.bind_addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(config.db_max_connections, 20);
        assert_eq!(config.log_level, "info");
        assert!(!config.poll_reject_after_close);
    }

    #[test]
    fn missing_secret_is_reported() {
        let result = Config::from_lookup(lookup(&[("DATABASE_URL", "postgres://localhost/clubs")]));
        assert_matches!(result, Err(ConfigError::Missing("JWT_SECRET")));
    }

    #[test]
    fn rejects_unparseable_values() {
        let result = Config::from_lookup(lookup(&[
            ("DATABASE_URL", "postgres://localhost/clubs"),
            ("JWT_SECRET", "s3cret"),
            ("POLL_REJECT_AFTER_CLOSE", "sometimes"),
        ]));
        assert_matches!(
            result,
            Err(ConfigError::Invalid {
                key: "POLL_REJECT_AFTER_CLOSE",
                ..
            })
        );
    }
}
