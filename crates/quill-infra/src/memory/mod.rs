//! In-memory repositories - used when no `DATABASE_URL` is configured.
//!
//! Data is lost on process restart.

mod comments;
mod posts;
mod users;

pub use comments::InMemoryCommentRepository;
pub use posts::InMemoryPostRepository;
pub use users::InMemoryUserRepository;
