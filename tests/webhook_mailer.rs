//! Integration tests for delivering alerts through the mail relay webhook.

use std::time::Duration;

use mockito::Matcher;
use permitminder::{
    config::{HttpRetryConfig, JitterSetting, MailerConfig, WebhookMailerConfig},
    mailer::{build_mailer, error::MailerError},
};
use serde_json::json;

fn relay_config(url: &str, max_retries: u32) -> MailerConfig {
    MailerConfig::Webhook(WebhookMailerConfig {
        url: url.parse().unwrap(),
        method: None,
        secret: Some("relay-secret".to_string()),
        headers: None,
        retry_policy: HttpRetryConfig {
            max_retries,
            initial_backoff_ms: Duration::from_millis(1),
            max_backoff_secs: Duration::from_secs(1),
            jitter: JitterSetting::None,
            ..Default::default()
        },
        http_client: Default::default(),
    })
}

#[tokio::test]
async fn accepted_send_is_signed() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/send")
        .match_header("x-signature", Matcher::Regex("^[0-9a-f]{64}$".to_string()))
        .match_header("x-timestamp", Matcher::Any)
        .match_body(Matcher::Json(json!({
            "to": "ops@example.com",
            "subject": "1 new exceedance",
            "body": "PA1 pH"
        })))
        .with_status(200)
        .create_async()
        .await;

    let mailer = build_mailer(&relay_config(&format!("{}/send", server.url()), 0)).unwrap();
    mailer.send("ops@example.com", "1 new exceedance", "PA1 pH").await.unwrap();

    mock.assert_async().await;
}

#[tokio::test]
async fn server_errors_fail_after_retries() {
    let mut server = mockito::Server::new_async().await;
    let mock = server.mock("POST", "/send").with_status(503).expect(3).create_async().await;

    let mailer = build_mailer(&relay_config(&format!("{}/send", server.url()), 2)).unwrap();
    let result = mailer.send("ops@example.com", "S", "B").await;

    assert!(matches!(result, Err(MailerError::SendFailed(_))));
    mock.assert_async().await;
}

#[tokio::test]
async fn stdout_mailer_is_the_default() {
    let mailer = build_mailer(&MailerConfig::default()).unwrap();
    assert!(mailer.send("ops@example.com", "S", "B").await.is_ok());
}
