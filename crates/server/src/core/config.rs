//! Server configuration

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use todo_common::env;

use crate::core::auth::AuthManager;
use crate::core::items::ItemManager;

/// Configuration for the To-Do server
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// SQLite connection string, e.g. `sqlite://todo.sqlite`
    pub database_url: String,
    /// HMAC secret used to sign session tokens
    pub jwt_secret: String,
    /// Port to listen on (all interfaces)
    pub port: u16,
    /// Lifetime of an issued token in hours
    pub token_ttl_hours: i64,
    /// bcrypt work factor
    pub bcrypt_cost: u32,
    /// Directory holding the web front end
    pub static_dir: PathBuf,
}

impl ServerConfig {
    pub const DEFAULT_PORT: u16 = 3000;
    pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 4;

    /// Build the config from `DATABASE_URL`, `JWT_SECRET`, `PORT`,
    /// `TOKEN_TTL_HOURS`, `BCRYPT_COST` and `STATIC_DIR`.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            database_url: env::var_or("DATABASE_URL", "sqlite://todo.sqlite"),
            jwt_secret: env::required("JWT_SECRET")?,
            port: env::parse_or("PORT", Self::DEFAULT_PORT)?,
            token_ttl_hours: env::parse_or("TOKEN_TTL_HOURS", Self::DEFAULT_TOKEN_TTL_HOURS)?,
            bcrypt_cost: env::parse_or("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            static_dir: PathBuf::from(env::var_or("STATIC_DIR", "static")),
        })
    }

    /// Config pointing at a database file inside `base_dir`.
    ///
    /// Uses the cheapest bcrypt cost; meant for tests and local tinkering.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>, jwt_secret: impl Into<String>) -> Self {
        let base = base_dir.into();
        Self {
            database_url: format!(
                "sqlite://{}",
                base.join("todo.sqlite").to_string_lossy().replace('\\', "/")
            ),
            jwt_secret: jwt_secret.into(),
            port: 0,
            token_ttl_hours: Self::DEFAULT_TOKEN_TTL_HOURS,
            bcrypt_cost: 4,
            static_dir: base.join("static"),
        }
    }
}

/// App state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: ServerConfig,
    pub auth: Arc<AuthManager>,
    pub items: Arc<ItemManager>,
}
