use std::collections::HashMap;
use std::env;
use std::str::FromStr;

use thiserror::Error;

use crate::auth::{DEFAULT_TOKEN_TTL_SECS, MAX_TOKEN_TTL_SECS};

const DEVELOPMENT_SECRET: &str = "my_secret_key";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set in {0:?} mode")]
    MissingSecret(Environment),

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(StorageBackend::Postgres),
            "memory" | "mem" | "in-memory" => Ok(StorageBackend::Memory),
            other => Err(format!("unknown storage backend '{}'", other)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub backend: StorageBackend,
    /// Full connection URL; takes precedence over the host/port/name parts
    pub url: Option<String>,
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: Option<String>,
    pub password: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
}

#[derive(Clone)]
pub struct SecurityConfig {
    pub secret_key: String,
    pub token_ttl_secs: u64,
    pub bcrypt_cost: u32,
    pub enable_cors: bool,
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("secret_key", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("bcrypt_cost", &self.bcrypt_cost)
            .field("enable_cors", &self.enable_cors)
            .finish()
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment = match lookup("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        };
        config.with_overrides(&lookup)
    }

    fn with_overrides(mut self, lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Server overrides
        if let Some(v) = lookup("APP_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("APP_PORT") {
            self.server.port = parse_var("APP_PORT", v)?;
        }

        // Database overrides
        let mut database_location_set = false;
        if let Some(v) = lookup("DATABASE_URL") {
            self.database.url = Some(v);
            database_location_set = true;
        }
        if let Some(v) = lookup("DATABASE_HOST") {
            self.database.host = v;
            database_location_set = true;
        }
        if let Some(v) = lookup("DATABASE_PORT") {
            self.database.port = parse_var("DATABASE_PORT", v)?;
        }
        if let Some(v) = lookup("DATABASE_NAME") {
            self.database.name = v;
        }
        if let Some(v) = lookup("DATABASE_USER") {
            self.database.user = Some(v);
        }
        if let Some(v) = lookup("DATABASE_PASSWORD") {
            self.database.password = Some(v);
        }
        if let Some(v) = lookup("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse_var("DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = lookup("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse_var("DATABASE_CONNECTION_TIMEOUT", v)?;
        }
        if database_location_set {
            self.database.backend = StorageBackend::Postgres;
        }
        if let Some(v) = lookup("STORAGE_BACKEND") {
            self.database.backend = v
                .parse()
                .map_err(|_| ConfigError::InvalidValue { key: "STORAGE_BACKEND", value: v })?;
        }

        // API overrides
        if let Some(v) = lookup("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = parse_var("API_ENABLE_REQUEST_LOGGING", v)?;
        }
        if let Some(v) = lookup("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = parse_var("API_MAX_REQUEST_SIZE_BYTES", v)?;
        }

        // Security overrides
        match lookup("SECRET_KEY") {
            Some(v) if !v.is_empty() => self.security.secret_key = v,
            _ if self.environment == Environment::Production => {
                return Err(ConfigError::MissingSecret(self.environment));
            }
            _ => {}
        }
        if let Some(v) = lookup("SECURITY_TOKEN_TTL_SECS") {
            let ttl: u64 = parse_var("SECURITY_TOKEN_TTL_SECS", v.clone())?;
            if ttl == 0 || ttl > MAX_TOKEN_TTL_SECS {
                return Err(ConfigError::InvalidValue { key: "SECURITY_TOKEN_TTL_SECS", value: v });
            }
            self.security.token_ttl_secs = ttl;
        }
        if let Some(v) = lookup("SECURITY_BCRYPT_COST") {
            let cost: u32 = parse_var("SECURITY_BCRYPT_COST", v.clone())?;
            if !(4..=31).contains(&cost) {
                return Err(ConfigError::InvalidValue { key: "SECURITY_BCRYPT_COST", value: v });
            }
            self.security.bcrypt_cost = cost;
        }
        if let Some(v) = lookup("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = parse_var("SECURITY_ENABLE_CORS", v)?;
        }

        Ok(self)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Memory,
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                name: "music_store".to_string(),
                user: None,
                password: None,
                max_connections: 10,
                connection_timeout: 30,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 10 * 1024 * 1024, // 10MB
            },
            security: SecurityConfig {
                secret_key: DEVELOPMENT_SECRET.to_string(),
                token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enable_cors: true,
            },
        }
    }

    pub fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                name: "music_store".to_string(),
                user: None,
                password: None,
                max_connections: 20,
                connection_timeout: 10,
            },
            api: ApiConfig {
                enable_request_logging: true,
                max_request_size_bytes: 5 * 1024 * 1024, // 5MB
            },
            security: SecurityConfig {
                secret_key: DEVELOPMENT_SECRET.to_string(),
                token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enable_cors: true,
            },
        }
    }

    pub fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 5000,
            },
            database: DatabaseConfig {
                backend: StorageBackend::Postgres,
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                name: "music_store".to_string(),
                user: None,
                password: None,
                max_connections: 50,
                connection_timeout: 5,
            },
            api: ApiConfig {
                enable_request_logging: false,
                max_request_size_bytes: 2 * 1024 * 1024, // 2MB
            },
            security: SecurityConfig {
                secret_key: String::new(),
                token_ttl_secs: DEFAULT_TOKEN_TTL_SECS,
                bcrypt_cost: bcrypt::DEFAULT_COST,
                enable_cors: false,
            },
        }
    }
}

fn parse_var<T: FromStr>(key: &'static str, value: String) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { key, value })
}

impl DatabaseConfig {
    /// Connection URL for the Postgres backend, assembled from parts when no
    /// `DATABASE_URL` was given.
    pub fn connection_url(&self) -> Result<String, url::ParseError> {
        if let Some(url) = &self.url {
            return url::Url::parse(url).map(String::from);
        }

        let mut url = url::Url::parse("postgres://localhost")?;
        url.set_host(Some(&self.host))?;
        // set_port/set_username only fail for cannot-be-a-base URLs, which postgres:// is not
        let _ = url.set_port(Some(self.port));
        if let Some(user) = &self.user {
            let _ = url.set_username(user);
        }
        if let Some(password) = &self.password {
            let _ = url.set_password(Some(password));
        }
        url.set_path(&format!("/{}", self.name));
        Ok(url.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::from_map(&vars(&[])).unwrap();
        assert_eq!(config.environment, Environment::Development);
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.database.backend, StorageBackend::Memory);
        assert_eq!(config.security.secret_key, DEVELOPMENT_SECRET);
        assert_eq!(config.security.token_ttl_secs, 3600);
    }

    #[test]
    fn test_production_requires_secret() {
        let err = AppConfig::from_map(&vars(&[("APP_ENV", "production")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingSecret(Environment::Production)));

        let config =
            AppConfig::from_map(&vars(&[("APP_ENV", "production"), ("SECRET_KEY", "s3cr3t")])).unwrap();
        assert_eq!(config.security.secret_key, "s3cr3t");
        assert_eq!(config.database.backend, StorageBackend::Postgres);
    }

    #[test]
    fn test_database_location_selects_postgres() {
        let config = AppConfig::from_map(&vars(&[("DATABASE_HOST", "db.internal")])).unwrap();
        assert_eq!(config.database.backend, StorageBackend::Postgres);

        let config = AppConfig::from_map(&vars(&[
            ("DATABASE_HOST", "db.internal"),
            ("STORAGE_BACKEND", "memory"),
        ]))
        .unwrap();
        assert_eq!(config.database.backend, StorageBackend::Memory);
    }

    #[test]
    fn test_invalid_port_is_rejected() {
        let err = AppConfig::from_map(&vars(&[("APP_PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "APP_PORT", .. }));
    }

    #[test]
    fn test_numeric_overrides_are_strict() {
        for (key, value) in [
            ("DATABASE_PORT", "five"),
            ("DATABASE_MAX_CONNECTIONS", "-1"),
            ("API_MAX_REQUEST_SIZE_BYTES", "2MB"),
            ("API_ENABLE_REQUEST_LOGGING", "yes"),
        ] {
            let err = AppConfig::from_map(&vars(&[(key, value)])).unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidValue { key: k, .. } if k == key),
                "{} accepted {}",
                key,
                value
            );
        }

        let config = AppConfig::from_map(&vars(&[
            ("DATABASE_PORT", "6543"),
            ("API_ENABLE_REQUEST_LOGGING", "false"),
        ]))
        .unwrap();
        assert_eq!(config.database.port, 6543);
        assert!(!config.api.enable_request_logging);
    }

    #[test]
    fn test_token_ttl_is_bounded() {
        for value in ["0", "10000000000000000", "18446744073709551615"] {
            let err = AppConfig::from_map(&vars(&[("SECURITY_TOKEN_TTL_SECS", value)])).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { key: "SECURITY_TOKEN_TTL_SECS", .. }));
        }

        let config = AppConfig::from_map(&vars(&[("SECURITY_TOKEN_TTL_SECS", "7200")])).unwrap();
        assert_eq!(config.security.token_ttl_secs, 7200);

        let err = AppConfig::from_map(&vars(&[("SECURITY_BCRYPT_COST", "40")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "SECURITY_BCRYPT_COST", .. }));
    }

    #[test]
    fn test_connection_url_from_parts() {
        let mut database = AppConfig::development().database;
        database.host = "db.internal".to_string();
        database.port = 6543;
        database.user = Some("shop".to_string());
        database.password = Some("pw".to_string());

        assert_eq!(
            database.connection_url().unwrap(),
            "postgres://shop:pw@db.internal:6543/music_store"
        );

        database.url = Some("postgres://u:p@localhost:5432/other?sslmode=disable".to_string());
        assert!(database.connection_url().unwrap().ends_with("/other?sslmode=disable"));
    }

    #[test]
    fn test_storage_backend_parsing() {
        assert_eq!("Postgres".parse::<StorageBackend>(), Ok(StorageBackend::Postgres));
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert!("mongo".parse::<StorageBackend>().is_err());
    }
}
