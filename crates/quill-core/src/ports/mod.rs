//! Ports - trait definitions for external dependencies.
//! These are the "interfaces" that infrastructure must implement.

mod auth;
mod gateway;
mod rate_limit;
mod repository;
mod storage;

pub use auth::{AuthError, PasswordService, TokenClaims, TokenService};
pub use gateway::{AuthGateway, BlogGateway};
pub use rate_limit::{RateLimitResult, RateLimiter};
pub use repository::{BaseRepository, CommentRepository, PostRepository, UserRepository};
pub use storage::{ObjectStorage, StorageError, StoredObject};
