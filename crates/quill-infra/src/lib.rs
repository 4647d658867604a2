//! # Quill Infrastructure
//!
//! Concrete implementations of the ports defined in `quill-core`.
//! Repositories, object storage, credentials, rate limiting and the HTTP
//! gateway client live here.
//!
//! ## Feature Flags
//!
//! - `full` (default) - All features enabled
//! - `minimal` - No external services, in-memory only
//! - `postgres` - PostgreSQL repositories via SeaORM
//! - `auth` - JWT + Argon2 authentication
//! - `rate-limit` - Rate limiting via governor
//! - `http-client` - `BlogGateway`/`AuthGateway` over the Quill HTTP API via reqwest

pub mod database;
pub mod memory;
pub mod storage;

#[cfg(feature = "auth")]
pub mod auth;

#[cfg(feature = "rate-limit")]
pub mod rate_limit;

#[cfg(feature = "http-client")]
pub mod http;

// Re-exports - In-Memory
pub use database::DatabaseConfig;
pub use memory::{InMemoryCommentRepository, InMemoryPostRepository, InMemoryUserRepository};
pub use storage::{FsObjectStorage, InMemoryObjectStorage};

#[cfg(feature = "postgres")]
pub use database::{
    DatabaseConnections, PostgresCommentRepository, PostgresPostRepository,
    PostgresUserRepository,
};

#[cfg(feature = "auth")]
pub use auth::{Argon2PasswordService, JwtTokenService};

#[cfg(feature = "rate-limit")]
pub use rate_limit::{InMemoryRateLimiter, RateLimitConfig};

#[cfg(feature = "http-client")]
pub use http::HttpGateway;
