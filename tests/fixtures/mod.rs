//! Shared wiremock fixtures for the tracker API and the origin site.

#![allow(dead_code)]

use campaign_provisioner::config::TrackerSettings;
use campaign_provisioner::{
    HttpPageFetcher, HttpTracker, ProvisionOptions, Provisioner, TrackerClient,
};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";

pub const CAMPAIGN_SHORT_INFO: &str = "/public/api/v1/campaign/short/info";
pub const TRAFFIC_SOURCES: &str = "/public/api/v1/traffic_source/list/filtered";
pub const DOMAINS: &str = "/public/api/v1/domains";
pub const LANDING_UPLOAD: &str = "/public/api/v1/landing/upload";
pub const LANDING_INTEGRATED: &str = "/public/api/v1/landing/integrated";
pub const CAMPAIGN: &str = "/public/api/v1/campaign";

pub fn tracker_settings(entrypoint: &str) -> TrackerSettings {
    TrackerSettings {
        entrypoint: entrypoint.to_string(),
        api_key: API_KEY.to_string(),
        timeout: Duration::from_secs(5),
        max_redirects: 10,
    }
}

/// Tracker API mock server
pub struct TrackerApiMock {
    pub server: MockServer,
}

impl TrackerApiMock {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    pub fn client(&self) -> TrackerClient {
        TrackerClient::new(&tracker_settings(&self.server.uri())).unwrap()
    }

    /// Authenticated endpoint answering `body` exactly `times` times
    pub async fn mock_json(&self, verb: &str, endpoint: &str, body: Value, times: u64) {
        Mock::given(method(verb))
            .and(path(endpoint.to_string()))
            .and(header("Api-key", API_KEY))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    pub async fn mock_campaigns(&self, campaigns: Value) {
        self.mock_json("GET", CAMPAIGN_SHORT_INFO, campaigns, 1).await;
    }

    pub async fn mock_traffic_sources(&self, sources: Value) {
        self.mock_json("GET", TRAFFIC_SOURCES, sources, 1).await;
    }

    pub async fn mock_domains(&self, domains: Value) {
        self.mock_json("GET", DOMAINS, domains, 1).await;
    }

    pub async fn mock_upload(&self, landing_file: &str) {
        self.mock_json("POST", LANDING_UPLOAD, json!({"landing_file": landing_file}), 1)
            .await;
    }

    pub async fn mock_create_landing(&self, id: Value) {
        self.mock_json("POST", LANDING_INTEGRATED, json!({"id": id}), 1).await;
    }

    pub async fn mock_create_campaign(&self, id: Value) {
        self.mock_json("POST", CAMPAIGN, json!({"id": id}), 1).await;
    }

    pub async fn mock_identity(&self, user_id: u64, permissions: Value) {
        self.mock_json(
            "GET",
            &format!("/public/api/v1/identity/{user_id}"),
            json!({"id": user_id, "login": "operator", "permissions": permissions}),
            1,
        )
        .await;
    }

    /// Every listing and create call of a successful run, ids as in the reference scenario
    pub async fn mock_happy_path(&self) {
        self.mock_campaigns(json!([])).await;
        self.mock_traffic_sources(json!([{"id": 3, "name": "FB"}, {"id": 7, "name": "GA"}]))
            .await;
        self.mock_domains(json!([
            {"id": "d0", "name": "old.tracker.test", "isDefault": false},
            {"id": "d1", "name": "tracker.test", "isDefault": true}
        ]))
        .await;
        self.mock_upload("/files/abc.php").await;
        self.mock_create_landing(json!(42)).await;
        self.mock_create_campaign(json!(99)).await;
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }

    pub async fn requests_to(&self, endpoint: &str) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.iter().filter(|r| r.url.path() == endpoint).count())
            .unwrap_or(0)
    }
}

/// Site whose front page gets re-hosted
pub struct OriginMock {
    pub server: MockServer,
}

impl OriginMock {
    pub async fn serving(domain: &str, html: &str) -> Self {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/{domain}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(html))
            .mount(&server)
            .await;
        Self { server }
    }

    pub fn fetcher(&self) -> HttpPageFetcher {
        HttpPageFetcher::new(
            format!("{}/{{domain}}", self.server.uri()),
            Duration::from_secs(5),
            10,
        )
        .unwrap()
    }

    pub async fn request_count(&self) -> usize {
        self.server
            .received_requests()
            .await
            .map(|requests| requests.len())
            .unwrap_or(0)
    }
}

pub fn provisioner(
    tracker: &TrackerApiMock,
    origin: &OriginMock,
    grant_user_id: Option<u64>,
) -> Provisioner {
    Provisioner::new(
        Arc::new(HttpTracker::new(tracker.client())),
        Arc::new(origin.fetcher()),
        ProvisionOptions {
            traffic_source_name: "GA".to_string(),
            grant_user_id,
        },
    )
}
