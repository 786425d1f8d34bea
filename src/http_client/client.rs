//! Builds the retrying HTTP client used to reach the mail relay.

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};
use thiserror::Error;

use crate::config::{HttpClientConfig, HttpRetryConfig, JitterSetting};

/// Errors raised while building an HTTP client.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// The underlying `reqwest::Client` could not be built.
    #[error("Failed to create HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Wraps `base_client` with retry middleware for transient errors.
pub fn create_retryable_http_client(
    config: &HttpRetryConfig,
    base_client: reqwest::Client,
) -> ClientWithMiddleware {
    let policy_builder = match config.jitter {
        JitterSetting::None => ExponentialBackoff::builder().jitter(Jitter::None),
        JitterSetting::Full => ExponentialBackoff::builder().jitter(Jitter::Full),
    };

    let retry_policy = policy_builder
        .base(config.base_for_backoff)
        .retry_bounds(config.initial_backoff_ms, config.max_backoff_secs)
        .build_with_max_retries(config.max_retries);

    ClientBuilder::new(base_client)
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build()
}

/// Builds a `reqwest::Client` from `client_config` and wraps it with the
/// retry policy.
pub fn create_http_client(
    retry_policy: &HttpRetryConfig,
    client_config: &HttpClientConfig,
) -> Result<ClientWithMiddleware, HttpClientError> {
    let base_client = reqwest::Client::builder()
        .pool_max_idle_per_host(client_config.max_idle_per_host)
        .connect_timeout(client_config.connect_timeout_secs)
        .timeout(client_config.request_timeout_secs)
        .build()?;

    Ok(create_retryable_http_client(retry_policy, base_client))
}
