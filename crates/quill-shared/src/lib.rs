//! # Quill Shared
//!
//! Wire types shared by the HTTP API and its clients: request bodies, the
//! success envelope and RFC 7807 problem documents.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
