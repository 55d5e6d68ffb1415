use serde::{Deserialize, Serialize};
use std::env;
use thiserror::Error;

/// Signing secret used when `SECRET_KEY` is not set. Rejected in production.
pub const FALLBACK_SECRET_KEY: &str = "your-fallback-secret-key-never-use-in-production";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub provider: ProviderConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    #[serde(skip_serializing)]
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub cors_origins: Vec<String>,
}

/// External identity provider that verifies email/password pairs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be set in {0:?}")]
    InsecureSecret(Environment),

    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build a config from an arbitrary variable source. `from_env` passes
    /// the process environment; tests pass a map.
    pub fn from_lookup<F>(var: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = match var("APP_ENV").as_deref() {
            Some("production") | Some("prod") => Environment::Production,
            Some("staging") | Some("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        let config = match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_overrides(&var)?;

        config.validate()?;
        Ok(config)
    }

    fn with_overrides<F>(mut self, var: &F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Server
        if let Some(v) = var("TRAIL_API_HOST") {
            self.server.host = v;
        }
        if let Some(v) = var("TRAIL_API_PORT").or_else(|| var("PORT")) {
            self.server.port = parse("TRAIL_API_PORT", v)?;
        }

        // Database
        if let Some(v) = var("DATABASE_URL") {
            self.database.url = v;
        }
        if let Some(v) = var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = parse("DATABASE_MAX_CONNECTIONS", v)?;
        }
        if let Some(v) = var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = parse("DATABASE_CONNECTION_TIMEOUT", v)?;
        }

        // Security
        if let Some(v) = var("SECRET_KEY") {
            self.security.secret_key = v;
        }
        if let Some(v) = var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            self.security.access_token_expire_minutes = parse("ACCESS_TOKEN_EXPIRE_MINUTES", v)?;
        }
        if let Some(v) = var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Identity provider
        if let Some(v) = var("AUTH_PROVIDER_URL") {
            self.provider.url = v;
        }
        if let Some(v) = var("AUTH_PROVIDER_TIMEOUT_SECS") {
            self.provider.timeout_secs = parse("AUTH_PROVIDER_TIMEOUT_SECS", v)?;
        }

        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let insecure = self.security.secret_key.is_empty()
            || self.security.secret_key == FALLBACK_SECRET_KEY;
        if insecure && self.environment != Environment::Development {
            return Err(ConfigError::InsecureSecret(self.environment));
        }
        if self.security.access_token_expire_minutes <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "ACCESS_TOKEN_EXPIRE_MINUTES",
                value: self.security.access_token_expire_minutes.to_string(),
            });
        }
        Ok(())
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 3000,
            },
            database: DatabaseConfig {
                url: "postgres://postgres@localhost:5432/trails".to_string(),
                max_connections: 10,
                connection_timeout: 30,
            },
            security: SecurityConfig {
                secret_key: FALLBACK_SECRET_KEY.to_string(),
                access_token_expire_minutes: 30,
                cors_origins: vec![
                    "http://localhost".to_string(),
                    "http://localhost:3000".to_string(),
                ],
            },
            provider: ProviderConfig {
                url: "https://web.socem.plymouth.ac.uk/COMP2001/auth/api/users".to_string(),
                timeout_secs: 10,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.security.cors_origins = vec!["https://web.socem.plymouth.ac.uk".to_string()];
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.security.cors_origins = vec!["https://web.socem.plymouth.ac.uk".to_string()];
        config.provider.timeout_secs = 5;
        config
    }
}

fn parse<T: std::str::FromStr>(name: &'static str, value: String) -> Result<T, ConfigError> {
    let parsed = value.trim().parse::<T>();
    parsed.map_err(|_| ConfigError::InvalidValue { name, value })
}
