use std::{sync::Arc, time::Duration};

use reqwest_middleware::ClientWithMiddleware;

use crate::{
    config::{HttpRetryConfig, JitterSetting},
    http_client::create_retryable_http_client,
};

/// Creates an HTTP client with a fast, jitter-free retry policy for tests.
pub fn create_test_http_client(max_retries: u32) -> Arc<ClientWithMiddleware> {
    let retry_policy = HttpRetryConfig {
        max_retries,
        initial_backoff_ms: Duration::from_millis(1),
        max_backoff_secs: Duration::from_millis(5),
        jitter: JitterSetting::None,
        ..Default::default()
    };
    Arc::new(create_retryable_http_client(&retry_policy, reqwest::Client::new()))
}
