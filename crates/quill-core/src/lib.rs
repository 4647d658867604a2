//! # Quill Core
//!
//! The domain layer of the Quill blog.
//! Entities, validation rules, pagination arithmetic, the gateway ports and the
//! client-side store live here. Nothing in this crate talks to a network or a
//! database directly; infrastructure plugs in through [`ports`].

pub mod accounts;
pub mod domain;
pub mod error;
pub mod gateway;
pub mod pagination;
pub mod ports;
pub mod store;
pub mod validation;

pub use accounts::Accounts;
pub use error::{DomainError, GatewayError, RepoError};
pub use gateway::RepositoryGateway;
