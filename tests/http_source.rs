#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::time::Duration;

use blurbs::content::{ContentSource, HttpContentSource, Substitution, acquire};
use blurbs::error::{ConfigError, ContentError, Error as BlurbError};
use serde_json::json;
use tokio::time::timeout;
use url::Url;
use wiremock::matchers::{header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn source(server: &MockServer) -> HttpContentSource {
    HttpContentSource::new(
        Url::parse(&format!("{}/jokes/random", server.uri())).expect("valid mock url"),
        Duration::from_secs(2),
        Duration::from_secs(1),
        true,
    )
    .expect("source")
}

#[tokio::test]
async fn fetch_returns_id_and_value() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jokes/random"))
        .and(header("accept", "application/json"))
        .and(header_exists("x-correlation-id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "categories": [],
            "icon_url": "https://example.invalid/icon.png",
            "id": "q8v1xgj2tp",
            "value": "Chuck Norris counted to infinity. Twice."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let raw = source(&server).fetch().await.expect("content");
    assert_eq!(raw.id, "q8v1xgj2tp");
    assert_eq!(raw.value, "Chuck Norris counted to infinity. Twice.");
}

#[tokio::test]
async fn acquire_rewrites_the_subject() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "abc",
            "value": "CHUCK NORRIS does not sleep. chuck norris waits."
        })))
        .mount(&server)
        .await;

    let substitution = Substitution::new("Chuck Norris", "Gabe").expect("substitution");
    let blurb = acquire(&source(&server), &substitution)
        .await
        .expect("blurb");
    assert_eq!(blurb.id, "abc");
    assert_eq!(blurb.text, "Gabe does not sleep. Gabe waits.");
}

#[tokio::test]
async fn server_errors_are_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let err = source(&server).fetch().await.expect_err("should fail");
    match err {
        ContentError::HttpStatus { status } => assert_eq!(status.as_u16(), 503),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn malformed_body_reports_a_preview() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let err = source(&server).fetch().await.expect_err("should fail");
    match err {
        ContentError::Json { message } => assert!(message.contains("<html>rate limited")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn payload_without_id_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": "anonymous"
        })))
        .mount(&server)
        .await;

    let err = source(&server).fetch().await.expect_err("should fail");
    assert!(matches!(err, ContentError::MissingField { field: "id" }));
    assert_eq!(err.kind(), "missing_field");
}

#[tokio::test]
async fn payload_without_value_is_rejected() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "x1"
        })))
        .mount(&server)
        .await;

    let err = source(&server).fetch().await.expect_err("should fail");
    assert!(matches!(err, ContentError::MissingField { field: "value" }));
}

#[tokio::test]
async fn slow_responses_time_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "slow", "value": "eventually"}))
                .set_delay(Duration::from_millis(1500)),
        )
        .mount(&server)
        .await;

    let source = HttpContentSource::new(
        Url::parse(&server.uri()).unwrap(),
        Duration::from_millis(300),
        Duration::from_millis(200),
        true,
    )
    .unwrap();

    let res = timeout(Duration::from_secs(5), source.fetch()).await;
    let err = res.expect("timeout future").expect_err("should fail");
    assert!(matches!(err, ContentError::Request { .. }));
    assert_eq!(err.kind(), "request");
}

#[test]
fn plain_http_needs_the_insecure_flag() {
    let url = Url::parse("http://127.0.0.1:9/jokes/random").unwrap();
    let err = HttpContentSource::new(url.clone(), Duration::from_secs(1), Duration::from_secs(1), false)
        .err()
        .expect("http must be rejected");
    assert!(matches!(
        err,
        BlurbError::Config(ConfigError::InvalidField {
            field: "content.url",
            ..
        })
    ));

    let source = HttpContentSource::new(url, Duration::from_secs(1), Duration::from_secs(1), true)
        .expect("insecure source");
    assert_eq!(source.url().scheme(), "http");
}
