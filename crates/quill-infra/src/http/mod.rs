//! HTTP client for the Quill API.

mod client;

pub use client::HttpGateway;
