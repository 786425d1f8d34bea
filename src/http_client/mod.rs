//! Retrying HTTP client construction.

mod client;

pub use client::{HttpClientError, create_http_client, create_retryable_http_client};
