use crate::error::{ProvisionError, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Source of the page that gets re-hosted as the campaign landing
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw body served for `domain`, untouched
    async fn fetch(&self, domain: &str) -> Result<Vec<u8>>;
}

/// Plain unauthenticated GET of the domain's front page
#[derive(Debug, Clone)]
pub struct HttpPageFetcher {
    http: Client,
    url_template: String,
}

impl HttpPageFetcher {
    /// `url_template` has `{domain}` substituted, normally `https://{domain}`
    pub fn new(url_template: impl Into<String>, timeout: Duration, max_redirects: usize) -> Result<Self> {
        let http = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(max_redirects))
            .gzip(true)
            .build()
            .map_err(|e| {
                ProvisionError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            url_template: url_template.into(),
        })
    }

    pub fn page_url(&self, domain: &str) -> String {
        self.url_template.replace("{domain}", domain)
    }
}

#[async_trait]
impl PageFetcher for HttpPageFetcher {
    async fn fetch(&self, domain: &str) -> Result<Vec<u8>> {
        let url = self.page_url(domain);
        let fetch_error = |source: reqwest::Error| ProvisionError::Fetch {
            url: url.clone(),
            source,
        };

        debug!(url, "Fetching landing content");

        let body = self
            .http
            .get(&url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(fetch_error)?
            .bytes()
            .await
            .map_err(fetch_error)?;

        Ok(body.to_vec())
    }
}
