//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use quill_infra::auth::{DEFAULT_JWT_SECRET, JwtConfig};
use quill_infra::database::DatabaseConfig;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    /// `None` runs on in-memory repositories.
    pub database: Option<DatabaseConfig>,
    /// Apply pending migrations at startup.
    pub run_migrations: bool,
    /// `None` keeps uploaded images in memory.
    pub storage_root: Option<PathBuf>,
    /// Prefix of the public image URLs handed back to clients.
    pub public_base_url: String,
    pub jwt: JwtConfig,
    pub rate_limit_max_requests: u32,
    pub rate_limit_window_secs: u64,
    /// Key the rate limiter on `Forwarded`/`X-Forwarded-For`. Only safe behind
    /// a proxy that overwrites those headers.
    pub trust_proxy_headers: bool,
    /// Upper bound for request bodies, image uploads included.
    pub max_upload_bytes: usize,
}

fn parsed<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn flag(key: &str) -> bool {
    env::var(key)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

impl AppConfig {
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = parsed("PORT", 8080);

        let database = env::var("DATABASE_URL").ok().map(|url| DatabaseConfig {
            url,
            max_connections: parsed("DB_MAX_CONNECTIONS", 20),
            min_connections: parsed("DB_MIN_CONNECTIONS", 2),
        });

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("http://{host}:{port}"))
            .trim_end_matches('/')
            .to_string();

        let jwt = JwtConfig {
            secret: env::var("JWT_SECRET").unwrap_or_else(|_| DEFAULT_JWT_SECRET.to_string()),
            expiration_hours: parsed("JWT_EXPIRATION_HOURS", 24),
            issuer: env::var("JWT_ISSUER").unwrap_or_else(|_| "quill".to_string()),
        };

        Self {
            database,
            run_migrations: flag("RUN_MIGRATIONS"),
            storage_root: env::var("STORAGE_ROOT").ok().map(PathBuf::from),
            public_base_url,
            jwt,
            rate_limit_max_requests: parsed("RATE_LIMIT_MAX_REQUESTS", 20),
            rate_limit_window_secs: parsed("RATE_LIMIT_WINDOW_SECS", 60),
            trust_proxy_headers: flag("TRUST_PROXY_HEADERS"),
            max_upload_bytes: parsed("MAX_UPLOAD_BYTES", 5 * 1024 * 1024),
            host,
            port,
        }
    }
}
