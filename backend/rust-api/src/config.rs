use serde::Deserialize;
use std::env;
use std::str::FromStr;

/// Which pair of stores backs the service. `memory` keeps everything in
/// process maps; `mongo-redis` puts the question bank in MongoDB and session
/// records in Redis.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StorageBackend {
    Memory,
    MongoRedis,
}

impl StorageBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageBackend::Memory => "memory",
            StorageBackend::MongoRedis => "mongo-redis",
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "mongo-redis" => Ok(StorageBackend::MongoRedis),
            _ => Err(format!("Invalid storage backend: {}", value)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub storage_backend: StorageBackend,
    pub mongo_uri: Option<String>,
    pub mongo_database: String,
    pub redis_uri: Option<String>,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        // Load environment variables from root .env file (two levels up)
        // Try root .env first, then fallback to local .env
        let skip_root_env = env::var("SKIP_ROOT_ENV").is_ok();
        if skip_root_env {
            dotenvy::dotenv().ok();
        } else if dotenvy::from_path("../../.env").is_err() {
            // Fallback to current directory .env for backward compatibility
            dotenvy::dotenv().ok();
        }

        // Determine environment (defaults to dev)
        let env = env::var("APP_ENV").unwrap_or_else(|_| "dev".to_string());

        // Build configuration from config/*.toml + ENV overrides
        let config_builder = config::Config::builder()
            // Load base config from TOML file
            .add_source(
                config::File::with_name(&format!("config/{}", env)).required(false), // Allow missing config file, fallback to ENV
            )
            // Override with environment variables (prefix: APP_)
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings = config_builder.build()?;

        // Extract values with fallbacks to ENV or defaults
        let port = settings
            .get_int("server.port")
            .ok()
            .and_then(|value| u16::try_from(value).ok())
            .or_else(|| env::var("PORT").ok().and_then(|value| value.parse().ok()))
            .unwrap_or(8081);

        let storage_backend = settings
            .get_string("storage.backend")
            .or_else(|_| env::var("STORAGE_BACKEND"))
            .unwrap_or_else(|_| "memory".to_string())
            .parse::<StorageBackend>()
            .map_err(config::ConfigError::Message)?;

        let mongo_uri = settings
            .get_string("database.mongo_uri")
            .or_else(|_| env::var("MONGO_URI"))
            .ok();

        let mongo_database = settings
            .get_string("database.mongo_database")
            .or_else(|_| env::var("MONGO_DATABASE"))
            .unwrap_or_else(|_| "certlab".to_string());

        let redis_uri = settings
            .get_string("redis.uri")
            .or_else(|_| env::var("REDIS_URI"))
            .ok();

        if storage_backend == StorageBackend::MongoRedis {
            if mongo_uri.is_none() {
                return Err(config::ConfigError::Message(
                    "mongo-redis backend requires database.mongo_uri (or MONGO_URI)".to_string(),
                ));
            }
            if redis_uri.is_none() {
                return Err(config::ConfigError::Message(
                    "mongo-redis backend requires redis.uri (or REDIS_URI)".to_string(),
                ));
            }
        }

        Ok(Config {
            port,
            storage_backend,
            mongo_uri,
            mongo_database,
            redis_uri,
        })
    }

    /// In-memory configuration, used by the integration test harness.
    pub fn in_memory() -> Self {
        Config {
            port: 0,
            storage_backend: StorageBackend::Memory,
            mongo_uri: None,
            mongo_database: "certlab".to_string(),
            redis_uri: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_config_env() {
        for key in [
            "APP_ENV",
            "PORT",
            "STORAGE_BACKEND",
            "MONGO_URI",
            "MONGO_DATABASE",
            "REDIS_URI",
        ] {
            std::env::remove_var(key);
        }
        std::env::set_var("SKIP_ROOT_ENV", "1");
    }

    #[test]
    #[serial]
    fn defaults_to_memory_backend() {
        clear_config_env();

        let config = Config::load().unwrap();
        assert_eq!(config.storage_backend, StorageBackend::Memory);
        assert_eq!(config.port, 8081);
        assert!(config.mongo_uri.is_none());
        assert!(config.redis_uri.is_none());
    }

    #[test]
    #[serial]
    fn mongo_redis_backend_requires_both_uris() {
        clear_config_env();
        std::env::set_var("STORAGE_BACKEND", "mongo-redis");
        std::env::set_var("MONGO_URI", "mongodb://localhost:27017/certlab");

        let err = Config::load().unwrap_err();
        assert!(err.to_string().contains("redis.uri"));

        std::env::set_var("REDIS_URI", "redis://127.0.0.1:6379/0");
        let config = Config::load().unwrap();
        assert_eq!(config.storage_backend, StorageBackend::MongoRedis);

        clear_config_env();
    }

    #[test]
    #[serial]
    fn rejects_unknown_backend() {
        clear_config_env();
        std::env::set_var("STORAGE_BACKEND", "cassandra");

        assert!(Config::load().is_err());

        clear_config_env();
    }

    #[test]
    #[serial]
    fn port_env_override() {
        clear_config_env();
        std::env::set_var("PORT", "9099");

        let config = Config::load().unwrap();
        assert_eq!(config.port, 9099);

        clear_config_env();
    }

    #[test]
    fn backend_name_round_trip() {
        assert_eq!(
            "mongo-redis".parse::<StorageBackend>().unwrap(),
            StorageBackend::MongoRedis
        );
        assert_eq!(StorageBackend::Memory.as_str(), "memory");
        assert!("mysql".parse::<StorageBackend>().is_err());
    }
}
