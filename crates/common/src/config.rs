use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

/// Document store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "e-commerce".to_string(),
        }
    }
}

/// Order event consumer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct KafkaConfig {
    pub brokers: String,
    pub topic: String,
    pub consumer_group: String,
}

impl Default for KafkaConfig {
    fn default() -> Self {
        Self {
            brokers: "localhost:9092".to_string(),
            topic: "order-created".to_string(),
            consumer_group: "product-service".to_string(),
        }
    }
}

/// Application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub mongo: MongoConfig,
    pub redis_url: String,
    pub kafka: KafkaConfig,
    pub port: u16,
    /// Deadline applied to every store call made on behalf of a request
    pub store_timeout_ms: u64,
    pub log_level: String,
    pub enable_jaeger: bool,
    pub jaeger_endpoint: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            mongo: MongoConfig::default(),
            redis_url: "redis://localhost:6379".to_string(),
            kafka: KafkaConfig::default(),
            port: 8080,
            store_timeout_ms: 5000,
            log_level: "info".to_string(),
            enable_jaeger: false,
            jaeger_endpoint: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the environment (and a `.env` file when present)
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Ok(Self {
            mongo: MongoConfig {
                uri: lookup("MONGO_URI").unwrap_or(defaults.mongo.uri),
                database: lookup("MONGO_DATABASE").unwrap_or(defaults.mongo.database),
            },
            redis_url: lookup("REDIS_URL").unwrap_or(defaults.redis_url),
            kafka: KafkaConfig {
                brokers: lookup("KAFKA_BROKERS").unwrap_or(defaults.kafka.brokers),
                topic: lookup("KAFKA_TOPIC").unwrap_or(defaults.kafka.topic),
                consumer_group: lookup("CONSUMER_GROUP").unwrap_or(defaults.kafka.consumer_group),
            },
            port: parse_or("PORT", lookup("PORT"), defaults.port)?,
            store_timeout_ms: parse_or(
                "STORE_TIMEOUT_MS",
                lookup("STORE_TIMEOUT_MS"),
                defaults.store_timeout_ms,
            )?,
            log_level: lookup("RUST_LOG").unwrap_or(defaults.log_level),
            enable_jaeger: parse_or("ENABLE_JAEGER", lookup("ENABLE_JAEGER"), defaults.enable_jaeger)?,
            jaeger_endpoint: lookup("JAEGER_ENDPOINT"),
        })
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_millis(self.store_timeout_ms)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &'static str,
    raw: Option<String>,
    default: T,
) -> Result<T, ConfigError> {
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_when_nothing_set() {
        let config = AppConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.mongo.database, "e-commerce");
        assert_eq!(config.kafka.topic, "order-created");
        assert_eq!(config.port, 8080);
        assert_eq!(config.store_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_overrides_from_lookup() {
        let vars: HashMap<&str, &str> = [
            ("MONGO_URI", "mongodb://db:27017"),
            ("PORT", "9090"),
            ("ENABLE_JAEGER", "true"),
        ]
        .into_iter()
        .collect();

        let config = AppConfig::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap();
        assert_eq!(config.mongo.uri, "mongodb://db:27017");
        assert_eq!(config.port, 9090);
        assert!(config.enable_jaeger);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let result = AppConfig::from_lookup(|key| (key == "PORT").then(|| "eighty".to_string()));
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue { key: "PORT", .. })
        ));
    }
}
