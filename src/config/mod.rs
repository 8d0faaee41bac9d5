//! Pipeline configuration
//!
//! Broker and store settings come from the process environment. Every
//! variable is required; nothing is defaulted except what the CLI controls.
//!
//! | Variable            | Used for                     |
//! |---------------------|------------------------------|
//! | `BOOTSTRAP_SERVERS` | broker addresses             |
//! | `SECURITY_PROTOCOL` | broker security protocol     |
//! | `SASL_MECHANISM`    | broker auth mechanism        |
//! | `USERNAME`          | broker user                  |
//! | `PASSWORD`          | broker password              |
//! | `GROUP`             | consumer group id            |
//! | `TOPIC`             | subscribed topic             |
//! | `RDS_ADDRESS`       | store host                   |
//! | `DATABASE_PORT`     | store port                   |
//! | `DB_USERNAME`       | store user                   |
//! | `DB_PASSWORD`       | store password               |
//! | `DB_NAME`           | store database               |

use std::fmt;

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Missing environment variable {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

/// A credential that never shows up in `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw value, for handing to a client library.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(***)")
    }
}

/// Message broker settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    pub bootstrap_servers: String,
    pub security_protocol: String,
    pub sasl_mechanism: String,
    pub username: String,
    pub password: Secret,
    pub group_id: String,
    pub topic: String,
}

/// Relational store settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: Secret,
    pub database: String,
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    pub broker: BrokerConfig,
    pub store: StoreConfig,
}

impl PipelineConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |var: &'static str| -> ConfigResult<String> {
            match lookup(var) {
                Some(value) if !value.trim().is_empty() => Ok(value),
                _ => Err(ConfigError::Missing(var)),
            }
        };

        let broker = BrokerConfig {
            bootstrap_servers: require("BOOTSTRAP_SERVERS")?,
            security_protocol: require("SECURITY_PROTOCOL")?,
            sasl_mechanism: require("SASL_MECHANISM")?,
            username: require("USERNAME")?,
            password: Secret::new(require("PASSWORD")?),
            group_id: require("GROUP")?,
            topic: require("TOPIC")?,
        };

        let port = require("DATABASE_PORT")?;
        let store = StoreConfig {
            host: require("RDS_ADDRESS")?,
            port: port.trim().parse().map_err(|e| ConfigError::Invalid {
                var: "DATABASE_PORT",
                reason: format!("'{}' is not a port number ({})", port, e),
            })?,
            username: require("DB_USERNAME")?,
            password: Secret::new(require("DB_PASSWORD")?),
            database: require("DB_NAME")?,
        };

        let config = Self { broker, store };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ConfigResult<()> {
        if self.store.port == 0 {
            return Err(ConfigError::Invalid {
                var: "DATABASE_PORT",
                reason: "port must be > 0".into(),
            });
        }
        if self.broker.topic.contains(char::is_whitespace) {
            return Err(ConfigError::Invalid {
                var: "TOPIC",
                reason: format!("'{}' contains whitespace", self.broker.topic),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, String> {
        [
            ("BOOTSTRAP_SERVERS", "broker-1:9092,broker-2:9092"),
            ("SECURITY_PROTOCOL", "SASL_SSL"),
            ("SASL_MECHANISM", "PLAIN"),
            ("USERNAME", "kiosk"),
            ("PASSWORD", "hunter2"),
            ("GROUP", "kiosk-ingest"),
            ("TOPIC", "lmnh"),
            ("RDS_ADDRESS", "db.internal"),
            ("DATABASE_PORT", "5432"),
            ("DB_USERNAME", "museum"),
            ("DB_PASSWORD", "s3cret"),
            ("DB_NAME", "museum"),
        ]
        .into_iter()
        .map(|(k, v)| (k, v.to_string()))
        .collect()
    }

    fn load(env: &HashMap<&'static str, String>) -> ConfigResult<PipelineConfig> {
        PipelineConfig::from_lookup(|var| env.get(var).cloned())
    }

    #[test]
    fn test_load_full_config() {
        let config = load(&full_env()).unwrap();
        assert_eq!(config.broker.topic, "lmnh");
        assert_eq!(config.broker.group_id, "kiosk-ingest");
        assert_eq!(config.store.port, 5432);
        assert_eq!(config.store.password.expose(), "s3cret");
    }

    #[test]
    fn test_missing_variable() {
        let mut env = full_env();
        env.remove("TOPIC");
        assert_eq!(load(&env), Err(ConfigError::Missing("TOPIC")));
    }

    #[test]
    fn test_blank_variable_is_missing() {
        let mut env = full_env();
        env.insert("DB_NAME", "  ".into());
        assert_eq!(load(&env), Err(ConfigError::Missing("DB_NAME")));
    }

    #[test]
    fn test_invalid_port() {
        let mut env = full_env();
        env.insert("DATABASE_PORT", "postgres".into());
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { var: "DATABASE_PORT", .. })
        ));

        env.insert("DATABASE_PORT", "0".into());
        assert!(matches!(
            load(&env),
            Err(ConfigError::Invalid { var: "DATABASE_PORT", .. })
        ));
    }

    #[test]
    fn test_secrets_redacted_in_debug() {
        let config = load(&full_env()).unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("hunter2"));
        assert!(!debug.contains("s3cret"));
        assert!(debug.contains("Secret(***)"));
    }
}
