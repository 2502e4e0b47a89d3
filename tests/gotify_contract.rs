//! Gotify Channel Contract Tests
//!
//! These tests verify the HTTP request the Gotify channel sends and how it
//! maps server responses:
//! - POST to `<host>/message` with the token as a query parameter
//! - JSON body with the digest, fixed title and Markdown display hint
//! - non-2xx responses surface as transport errors

use serde_json::json;
use task_reminder::channels::gotify::{GotifyNotifier, MESSAGE_TITLE};
use task_reminder::config::GotifyConfig;
use task_reminder::credentials::Secret;
use task_reminder::{Notifier, ReminderError};
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIGEST: &str = "## Due today\n\n- Pay rent\n\n";

fn notifier(host: String, priority: Option<u8>) -> GotifyNotifier {
    GotifyNotifier::new(GotifyConfig {
        host,
        token: Secret::new("AppToken123"),
        priority,
        ca_cert: None,
    })
    .expect("client builds")
}

// ────────────────────────────────────────────────────────────────────────────
// Request Format
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_posts_message_with_token_and_markdown_hint() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/message"))
        .and(query_param("token", "AppToken123"))
        .and(body_json(json!({
            "message": DIGEST,
            "title": "Daily tasks reminder",
            "extras": {
                "client::display": {"contentType": "text/markdown"}
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 25,
            "appid": 5,
            "message": DIGEST,
            "title": MESSAGE_TITLE,
            "priority": 0,
            "date": "2026-10-16T07:00:00Z"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let result = notifier(mock_server.uri(), None).notify(DIGEST).await;
    assert!(result.is_ok(), "delivery should succeed: {result:?}");
}

#[tokio::test]
async fn test_host_with_trailing_slash() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 1})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let host = format!("{}/", mock_server.uri());
    assert!(notifier(host, None).notify(DIGEST).await.is_ok());
}

#[tokio::test]
async fn test_includes_configured_priority() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/message"))
        .and(body_partial_json(json!({"priority": 8})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 2})))
        .expect(1)
        .mount(&mock_server)
        .await;

    assert!(notifier(mock_server.uri(), Some(8)).notify(DIGEST).await.is_ok());
}

// ────────────────────────────────────────────────────────────────────────────
// Error Mapping
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_unauthorized_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/message"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Unauthorized",
            "errorCode": 401,
            "errorDescription": "you need to provide a valid access token or user credentials to access this api"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let digest = DIGEST.to_owned();
    let err = notifier(mock_server.uri(), None)
        .notify(&digest)
        .await
        .expect_err("401 must fail");

    assert!(matches!(err, ReminderError::Transport(_)), "{err}");
    assert!(err.to_string().contains("401"));
    assert_eq!(digest, DIGEST);
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/message"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&mock_server)
        .await;

    let err = notifier(mock_server.uri(), None)
        .notify(DIGEST)
        .await
        .expect_err("500 must fail");
    assert!(matches!(err, ReminderError::Transport(_)));
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error_without_token() {
    // Port 9 (discard) on localhost is expected to refuse connections.
    let err = notifier("http://127.0.0.1:9".to_owned(), None)
        .notify(DIGEST)
        .await
        .expect_err("connection must fail");

    assert!(matches!(err, ReminderError::Transport(_)));
    assert!(!err.to_string().contains("AppToken123"));
}
