//! Process settings read once from the environment (and `.env`, loaded by the binary).

use crate::error::ConfigError;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://ledger.db";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";

#[derive(Clone, Debug)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    /// Ledger table JSON. `None` uses the table shipped with the crate.
    pub ledger_config: Option<PathBuf>,
    pub verbose: bool,
    pub max_connections: u32,
    pub body_limit_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            ledger_config: None,
            verbose: true,
            max_connections: 5,
            body_limit_bytes: 64 * 1024,
        }
    }
}

impl Settings {
    /// Read `DATABASE_URL`, `BIND_ADDR`, `LEDGER_CONFIG`, `VERBOSE`, `MAX_CONNECTIONS`, `BODY_LIMIT_BYTES`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let verbose = match lookup("VERBOSE") {
            Some(v) => parse_bool("VERBOSE", &v)?,
            None => defaults.verbose,
        };
        let max_connections = match lookup("MAX_CONNECTIONS") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::Validation(format!("MAX_CONNECTIONS must be a positive integer, got '{}'", v)))?,
            None => defaults.max_connections,
        };
        let body_limit_bytes = match lookup("BODY_LIMIT_BYTES") {
            Some(v) => v
                .parse::<usize>()
                .map_err(|_| ConfigError::Validation(format!("BODY_LIMIT_BYTES must be an integer, got '{}'", v)))?,
            None => defaults.body_limit_bytes,
        };
        Ok(Settings {
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            bind_addr: lookup("BIND_ADDR").unwrap_or(defaults.bind_addr),
            ledger_config: lookup("LEDGER_CONFIG").filter(|s| !s.is_empty()).map(PathBuf::from),
            verbose,
            max_connections,
            body_limit_bytes,
        })
    }

    /// Default `tracing` directive when `RUST_LOG` is unset.
    pub fn log_directive(&self) -> &'static str {
        if self.verbose {
            "ledger_sdk=debug"
        } else {
            "ledger_sdk=info"
        }
    }

    pub fn is_memory_database(&self) -> bool {
        self.database_url.contains(":memory:") || self.database_url.contains("mode=memory")
    }
}

fn parse_bool(key: &str, v: &str) -> Result<bool, ConfigError> {
    match v.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Validation(format!("{} must be a boolean, got '{}'", key, v))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k: &str| map.get(k).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let s = Settings::from_lookup(lookup(&[])).unwrap();
        assert_eq!(s.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(s.bind_addr, DEFAULT_BIND_ADDR);
        assert!(s.ledger_config.is_none());
        assert!(s.verbose);
        assert_eq!(s.log_directive(), "ledger_sdk=debug");
    }

    #[test]
    fn reads_overrides() {
        let s = Settings::from_lookup(lookup(&[
            ("DATABASE_URL", "sqlite::memory:"),
            ("VERBOSE", "false"),
            ("MAX_CONNECTIONS", "2"),
            ("LEDGER_CONFIG", "/etc/ledgers.json"),
        ]))
        .unwrap();
        assert!(s.is_memory_database());
        assert!(!s.verbose);
        assert_eq!(s.max_connections, 2);
        assert_eq!(s.ledger_config, Some(PathBuf::from("/etc/ledgers.json")));
        assert_eq!(s.log_directive(), "ledger_sdk=info");
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(Settings::from_lookup(lookup(&[("VERBOSE", "maybe")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("MAX_CONNECTIONS", "0")])).is_err());
        assert!(Settings::from_lookup(lookup(&[("BODY_LIMIT_BYTES", "big")])).is_err());
    }
}
