//! Typed tracker operations.
//!
//! [`TrackerApi`] has one method per endpoint the provisioning run touches so the
//! workflow can be driven by a mock in tests. [`HttpTracker`] is the real thing,
//! built on [`TrackerClient`].

use super::client::{FileUpload, RequestBody, TrackerClient};
use super::types::{
    CampaignDraft, CampaignSummary, CreatedEntity, DomainRecord, Identity, NewLanding,
    PermissionsPayload, TrafficSource, UploadedLandingFile,
};
use crate::error::{ProvisionError, Result};
use async_trait::async_trait;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

pub mod endpoints {
    pub const CAMPAIGN_SHORT_INFO: &str = "/public/api/v1/campaign/short/info";
    pub const TRAFFIC_SOURCES: &str = "/public/api/v1/traffic_source/list/filtered";
    pub const DOMAINS: &str = "/public/api/v1/domains";
    pub const LANDING_UPLOAD: &str = "/public/api/v1/landing/upload";
    pub const LANDING_INTEGRATED: &str = "/public/api/v1/landing/integrated";
    pub const CAMPAIGN: &str = "/public/api/v1/campaign";

    pub fn identity(user_id: u64) -> String {
        format!("/public/api/v1/identity/{user_id}")
    }

    pub fn user_permissions(user_id: u64) -> String {
        format!("/public/api/v1/user/{user_id}/permissions")
    }
}

/// Multipart field the upload endpoint reads the file from
pub const UPLOAD_FIELD: &str = "file";

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TrackerApi: Send + Sync {
    async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>>;

    async fn list_traffic_sources(&self) -> Result<Vec<TrafficSource>>;

    async fn list_domains(&self) -> Result<Vec<DomainRecord>>;

    /// Upload a local file and return the server-side path it was stored under
    async fn upload_landing_file(
        &self,
        path: &Path,
        file_name: &str,
        mime: &str,
    ) -> Result<UploadedLandingFile>;

    async fn create_landing(&self, landing: &NewLanding) -> Result<CreatedEntity>;

    async fn create_campaign(&self, campaign: &CampaignDraft) -> Result<CreatedEntity>;

    /// Fetch a user together with its permission blocks
    async fn get_identity(&self, user_id: u64) -> Result<Identity>;

    /// Replace all permissions of a user
    async fn set_permissions(&self, user_id: u64, permissions: &PermissionsPayload) -> Result<()>;
}

/// [`TrackerApi`] over HTTP
#[derive(Debug, Clone)]
pub struct HttpTracker {
    client: TrackerClient,
}

impl HttpTracker {
    pub fn new(client: TrackerClient) -> Self {
        Self { client }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.client.url(path);
        let value = self.client.send(Method::GET, &url, RequestBody::Empty).await?;
        decode(&url, value)
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.client.url(path);
        let json = serde_json::to_string(body)
            .map_err(|e| ProvisionError::malformed(&url, format!("could not encode request: {e}")))?;
        let value = self.client.send(method, &url, RequestBody::Json(json)).await?;
        decode(&url, value)
    }
}

#[async_trait]
impl TrackerApi for HttpTracker {
    async fn list_campaigns(&self) -> Result<Vec<CampaignSummary>> {
        self.get(endpoints::CAMPAIGN_SHORT_INFO).await
    }

    async fn list_traffic_sources(&self) -> Result<Vec<TrafficSource>> {
        self.get(endpoints::TRAFFIC_SOURCES).await
    }

    async fn list_domains(&self) -> Result<Vec<DomainRecord>> {
        self.get(endpoints::DOMAINS).await
    }

    async fn upload_landing_file(
        &self,
        path: &Path,
        file_name: &str,
        mime: &str,
    ) -> Result<UploadedLandingFile> {
        let url = self.client.url(endpoints::LANDING_UPLOAD);
        let upload = FileUpload {
            field: UPLOAD_FIELD.to_string(),
            path: path.to_path_buf(),
            file_name: file_name.to_string(),
            mime: mime.to_string(),
        };
        let value = self
            .client
            .send(Method::POST, &url, RequestBody::File(upload))
            .await?;
        decode(&url, value)
    }

    async fn create_landing(&self, landing: &NewLanding) -> Result<CreatedEntity> {
        self.send_json(Method::POST, endpoints::LANDING_INTEGRATED, landing)
            .await
    }

    async fn create_campaign(&self, campaign: &CampaignDraft) -> Result<CreatedEntity> {
        self.send_json(Method::POST, endpoints::CAMPAIGN, campaign).await
    }

    async fn get_identity(&self, user_id: u64) -> Result<Identity> {
        self.get(&endpoints::identity(user_id)).await
    }

    async fn set_permissions(&self, user_id: u64, permissions: &PermissionsPayload) -> Result<()> {
        let _: Value = self
            .send_json(Method::PUT, &endpoints::user_permissions(user_id), permissions)
            .await?;
        Ok(())
    }
}

fn decode<T: DeserializeOwned>(url: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| ProvisionError::malformed(url, e))
}
