//! Application configuration loaded from environment variables.

use std::env;

use parley_core::services::DEFAULT_PAGE_SIZE;
use parley_infra::{DatabaseConfig, JwtConfig};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs the server on the in-memory store.
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations at startup.
    pub auto_migrate: bool,
    pub jwt: JwtConfig,
    pub posts_per_page: u64,
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse().ok())
}

fn flag(key: &str, default: bool) -> bool {
    env::var(key)
        .map(|v| v != "false" && v != "0")
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(100),
            min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(10),
        });

        let jwt_defaults = JwtConfig::default();
        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or(jwt_defaults.secret),
            expiration_hours: parsed("JWT_EXPIRATION_HOURS")
                .unwrap_or(jwt_defaults.expiration_hours),
            issuer: env::var("JWT_ISSUER").unwrap_or(jwt_defaults.issuer),
        };

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            database,
            auto_migrate: flag("DB_AUTO_MIGRATE", true),
            jwt,
            posts_per_page: parsed("POSTS_PER_PAGE").unwrap_or(DEFAULT_PAGE_SIZE),
        }
    }

    pub fn is_production() -> bool {
        env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false)
    }
}
