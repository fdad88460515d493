//! Tracker client tests against a wiremock tracker
//!
//! Covers authentication header, request encoding per method and how tracker
//! responses are turned into values or errors.

use campaign_provisioner::tracker::client::FileUpload;
use campaign_provisioner::{ProvisionError, RequestBody, TrackerClient};
use reqwest::Method;
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use wiremock::matchers::{body_json, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

mod fixtures;
use fixtures::{tracker_settings, TrackerApiMock, API_KEY, DOMAINS};

#[tokio::test]
async fn test_get_sends_api_key_and_decodes_json() {
    let mock = TrackerApiMock::new().await;
    mock.mock_domains(json!([{"id": "d1", "isDefault": true}])).await;

    let client = mock.client();
    let value = client
        .send(Method::GET, &client.url(DOMAINS), RequestBody::Empty)
        .await
        .unwrap();

    assert_eq!(value, json!([{"id": "d1", "isDefault": true}]));

    let requests = mock.server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].url.query(), None);
}

#[tokio::test]
async fn test_get_encodes_query_pairs() {
    let mock = TrackerApiMock::new().await;
    Mock::given(method("GET"))
        .and(path("/public/api/v1/campaign/short/info"))
        .and(query_param("datePreset", "today"))
        .and(query_param("timezone", "+00:00"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let body = RequestBody::Query(vec![
        ("datePreset".to_string(), "today".to_string()),
        ("timezone".to_string(), "+00:00".to_string()),
    ]);
    let value = client
        .send(Method::GET, &client.url("/public/api/v1/campaign/short/info"), body)
        .await
        .unwrap();

    assert_eq!(value, json!([]));
}

#[tokio::test]
async fn test_post_sends_json_body_untouched() {
    let mock = TrackerApiMock::new().await;
    Mock::given(method("POST"))
        .and(path("/public/api/v1/landing/integrated"))
        .and(header("Api-key", API_KEY))
        .and(body_json(json!({"name": "shop1.test white", "path": "/files/abc.php"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let value = client
        .send(
            Method::POST,
            &client.url("/public/api/v1/landing/integrated"),
            RequestBody::Json(r#"{"name":"shop1.test white","path":"/files/abc.php"}"#.to_string()),
        )
        .await
        .unwrap();

    assert_eq!(value["id"], 42);
}

#[tokio::test]
async fn test_put_is_supported() {
    let mock = TrackerApiMock::new().await;
    mock.mock_json("PUT", "/public/api/v1/user/5/permissions", json!({"id": 5}), 1)
        .await;

    let client = mock.client();
    let value = client
        .send(
            Method::PUT,
            &client.url("/public/api/v1/user/5/permissions"),
            RequestBody::Json(r#"{"permissions":[]}"#.to_string()),
        )
        .await
        .unwrap();

    assert_eq!(value, json!({"id": 5}));
}

#[tokio::test]
async fn test_file_upload_is_multipart() {
    let mock = TrackerApiMock::new().await;
    Mock::given(method("POST"))
        .and(path("/public/api/v1/landing/upload"))
        .and(header("Api-key", API_KEY))
        .and(body_string_contains("name=\"file\""))
        .and(body_string_contains("filename=\"index.php\""))
        .and(body_string_contains("application/x-php"))
        .and(body_string_contains("<h1>hello</h1>"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"landing_file": "/files/abc.php"})))
        .expect(1)
        .mount(&mock.server)
        .await;

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"<h1>hello</h1>").unwrap();

    let client = mock.client();
    let upload = FileUpload {
        field: "file".to_string(),
        path: file.path().to_path_buf(),
        file_name: "index.php".to_string(),
        mime: "application/x-php".to_string(),
    };
    let value = client
        .send(
            Method::POST,
            &client.url("/public/api/v1/landing/upload"),
            RequestBody::File(upload),
        )
        .await
        .unwrap();

    assert_eq!(value["landing_file"], "/files/abc.php");
}

#[tokio::test]
async fn test_errors_payload_fails_regardless_of_status() {
    for status in [200, 400, 500] {
        let mock = TrackerApiMock::new().await;
        Mock::given(method("GET"))
            .and(path(DOMAINS))
            .respond_with(
                ResponseTemplate::new(status).set_body_json(json!({"errors": "Access denied"})),
            )
            .mount(&mock.server)
            .await;

        let client = mock.client();
        let err = client
            .send(Method::GET, &client.url(DOMAINS), RequestBody::Empty)
            .await
            .unwrap_err();

        match err {
            ProvisionError::Api { errors, .. } => assert_eq!(errors, json!("Access denied")),
            other => panic!("status {status}: expected ApiError, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_error_status_without_errors_key_is_not_inspected() {
    let mock = TrackerApiMock::new().await;
    Mock::given(method("GET"))
        .and(path(DOMAINS))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "gone"})))
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let value = client
        .send(Method::GET, &client.url(DOMAINS), RequestBody::Empty)
        .await
        .unwrap();

    assert_eq!(value, json!({"message": "gone"}));
}

#[tokio::test]
async fn test_unsupported_method_sends_nothing() {
    let mock = TrackerApiMock::new().await;
    let client = mock.client();

    let err = client
        .send(Method::DELETE, &client.url(DOMAINS), RequestBody::Empty)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::UnsupportedMethod(_)));
    assert!(err.to_string().starts_with("UnsupportedMethodError"));
    assert_eq!(mock.request_count().await, 0);
}

#[tokio::test]
async fn test_get_with_json_body_is_rejected() {
    let mock = TrackerApiMock::new().await;
    let client = mock.client();

    let err = client
        .send(Method::GET, &client.url(DOMAINS), RequestBody::Json("{}".to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::UnsupportedMethod(_)));
    assert_eq!(mock.request_count().await, 0);
}

#[tokio::test]
async fn test_connection_failure_is_transport_error() {
    // Nothing listens on port 9 of localhost
    let client = TrackerClient::new(&tracker_settings("http://127.0.0.1:9")).unwrap();

    let err = client
        .send(Method::GET, &client.url(DOMAINS), RequestBody::Empty)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Transport { .. }));
    assert!(err.to_string().starts_with("TransportError"));
}

#[tokio::test]
async fn test_html_error_page_is_malformed_response() {
    let mock = TrackerApiMock::new().await;
    Mock::given(method("GET"))
        .and(path(DOMAINS))
        .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>"))
        .mount(&mock.server)
        .await;

    let client = mock.client();
    let err = client
        .send(Method::GET, &client.url(DOMAINS), RequestBody::Empty)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::MalformedResponse { .. }));
}

/// `/hop/0` redirects to `/hop/1` and so on; `/hop/{hops}` answers with `[]`
async fn mount_redirect_chain(mock: &TrackerApiMock, hops: usize) {
    for hop in 0..hops {
        Mock::given(method("GET"))
            .and(path(format!("/hop/{hop}")))
            .respond_with(
                ResponseTemplate::new(302).insert_header("Location", format!("/hop/{}", hop + 1)),
            )
            .mount(&mock.server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path(format!("/hop/{hops}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock.server)
        .await;
}

#[tokio::test]
async fn test_follows_up_to_ten_redirects() {
    let mock = TrackerApiMock::new().await;
    mount_redirect_chain(&mock, 10).await;

    let client = mock.client();
    let value = client
        .send(Method::GET, &client.url("/hop/0"), RequestBody::Empty)
        .await
        .unwrap();

    assert_eq!(value, json!([]));
    assert_eq!(mock.request_count().await, 11);
}

#[tokio::test]
async fn test_eleventh_redirect_is_transport_error() {
    let mock = TrackerApiMock::new().await;
    mount_redirect_chain(&mock, 11).await;

    let client = mock.client();
    let err = client
        .send(Method::GET, &client.url("/hop/0"), RequestBody::Empty)
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Transport { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_slow_tracker_hits_the_configured_timeout() {
    let mock = TrackerApiMock::new().await;
    Mock::given(method("GET"))
        .and(path(DOMAINS))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&mock.server)
        .await;

    let mut settings = tracker_settings(&mock.server.uri());
    settings.timeout = Duration::from_millis(200);
    let client = TrackerClient::new(&settings).unwrap();

    let err = client
        .send(Method::GET, &client.url(DOMAINS), RequestBody::Empty)
        .await
        .unwrap_err();

    match err {
        ProvisionError::Transport { source, .. } => assert!(source.is_timeout()),
        other => panic!("expected TransportError, got {other:?}"),
    }
}
