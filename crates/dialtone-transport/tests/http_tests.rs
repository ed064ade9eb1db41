// SPDX-FileCopyrightText: 2026 Dialtone Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire-level tests for the HTTP transport against a mock collector.

use std::time::Duration;

use dialtone_core::{DialtoneError, ReportTransport, is_accepted_status};
use dialtone_transport::HttpTransport;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn transport() -> HttpTransport {
    HttpTransport::new(Duration::from_millis(3000)).unwrap()
}

#[tokio::test]
async fn posts_json_body_with_content_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/feedback"))
        .and(header("content-type", "application/json"))
        .and(body_json(serde_json::json!({"happy": true})))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    let status = transport()
        .post_json(
            &format!("{}/api/v1/feedback", server.uri()),
            br#"{"happy":true}"#.to_vec(),
        )
        .await
        .unwrap();
    assert_eq!(status, 201);
}

#[tokio::test]
async fn redirect_status_is_returned_not_followed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit"))
        .respond_with(ResponseTemplate::new(302).insert_header("location", "/elsewhere"))
        .expect(1)
        .mount(&server)
        .await;

    let status = transport()
        .post_json(&format!("{}/submit", server.uri()), b"{}".to_vec())
        .await
        .unwrap();
    assert_eq!(status, 302);
    assert!(is_accepted_status(status));
}

#[tokio::test]
async fn server_error_status_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let status = transport()
        .post_json(&server.uri(), b"{}".to_vec())
        .await
        .unwrap();
    assert_eq!(status, 500);
    assert!(!is_accepted_status(status));
}

#[tokio::test]
async fn slow_collector_maps_to_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
        .mount(&server)
        .await;

    let transport = HttpTransport::new(Duration::from_millis(50)).unwrap();
    let err = transport
        .post_json(&server.uri(), b"{}".to_vec())
        .await
        .unwrap_err();
    assert!(matches!(err, DialtoneError::Timeout { .. }), "got {err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn unreachable_host_maps_to_transport_error() {
    // Port 9 (discard) on localhost is not listening in test environments.
    let err = transport()
        .post_json("http://127.0.0.1:9/submit", b"{}".to_vec())
        .await
        .unwrap_err();
    assert!(
        matches!(err, DialtoneError::Transport { .. } | DialtoneError::Timeout { .. }),
        "got {err:?}"
    );
}
