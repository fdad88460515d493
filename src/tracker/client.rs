use crate::config::TrackerSettings;
use crate::error::{ProvisionError, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Version};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Payload attached to a tracker request
#[derive(Debug, Clone)]
pub enum RequestBody {
    Empty,
    /// Encoded into the query string, GET only
    Query(Vec<(String, String)>),
    /// Pre-encoded JSON document, sent untouched
    Json(String),
    /// Local file sent as a single-part multipart form
    File(FileUpload),
}

impl RequestBody {
    fn kind(&self) -> &'static str {
        match self {
            RequestBody::Empty => "empty",
            RequestBody::Query(_) => "query",
            RequestBody::Json(_) => "json",
            RequestBody::File(_) => "file",
        }
    }
}

#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Multipart field name
    pub field: String,
    /// Local file to read
    pub path: PathBuf,
    /// File name announced to the tracker
    pub file_name: String,
    pub mime: String,
}

impl FileUpload {
    async fn into_form(self) -> Result<Form> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|source| ProvisionError::Io {
                context: format!("reading {}", self.path.display()),
                source,
            })?;

        let part = Part::bytes(bytes)
            .file_name(self.file_name)
            .mime_str(&self.mime)
            .map_err(|e| ProvisionError::Io {
                context: format!("invalid MIME type {}", self.mime),
                source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
            })?;

        Ok(Form::new().part(self.field, part))
    }
}

/// Thin HTTP client for the tracker REST API.
///
/// Every request carries the `Api-key` header, speaks HTTP/1.1 and is bounded by
/// the configured timeout and redirect limit. The HTTP status is not inspected:
/// a response is a failure only when its JSON body carries an `errors` key.
#[derive(Clone)]
pub struct TrackerClient {
    http: Client,
    entrypoint: String,
    api_key: String,
}

impl fmt::Debug for TrackerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerClient")
            .field("entrypoint", &self.entrypoint)
            .field("api_key", &"<redacted>")
            .finish_non_exhaustive()
    }
}

impl TrackerClient {
    pub fn new(settings: &TrackerSettings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(settings.max_redirects))
            .http1_only()
            .gzip(true)
            .build()
            .map_err(|e| {
                ProvisionError::Configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            http,
            entrypoint: settings.entrypoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }

    /// Absolute URL of an API path such as `/public/api/v1/domains`
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.entrypoint, path)
    }

    /// Issue a GET, POST or PUT and return the decoded JSON body
    pub async fn send(&self, method: Method, url: &str, body: RequestBody) -> Result<Value> {
        let request = self.build_request(method.clone(), url, body).await?;

        debug!(%method, url, "Sending tracker request");

        let response = request
            .send()
            .await
            .map_err(|source| ProvisionError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ProvisionError::Transport {
                url: url.to_string(),
                source,
            })?;

        debug!(%method, url, status = status.as_u16(), bytes = text.len(), "Tracker responded");

        parse_response(url, &text)
    }

    async fn build_request(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> Result<RequestBuilder> {
        let request = if method == Method::GET {
            let query = match body {
                RequestBody::Empty => Vec::new(),
                RequestBody::Query(pairs) => pairs,
                other => {
                    return Err(ProvisionError::UnsupportedMethod(format!(
                        "GET cannot carry a {} body",
                        other.kind()
                    )))
                }
            };

            let request = self.http.get(url);
            if query.is_empty() {
                request
            } else {
                request.query(&query)
            }
        } else if method == Method::POST || method == Method::PUT {
            let request = self.http.request(method, url);
            match body {
                RequestBody::Empty => request,
                RequestBody::Query(pairs) => request.form(&pairs),
                RequestBody::Json(json) => request.header(CONTENT_TYPE, "application/json").body(json),
                RequestBody::File(upload) => request.multipart(upload.into_form().await?),
            }
        } else {
            return Err(ProvisionError::UnsupportedMethod(format!(
                "{method} is not supported by the tracker client"
            )));
        };

        Ok(request
            .header("Api-key", &self.api_key)
            .version(Version::HTTP_11))
    }
}

/// Decode a tracker response body, surfacing an `errors` payload as [`ProvisionError::Api`]
pub fn parse_response(url: &str, text: &str) -> Result<Value> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| ProvisionError::malformed(url, format!("invalid JSON: {e}")))?;

    if let Some(errors) = value.as_object().and_then(|map| map.get("errors")) {
        return Err(ProvisionError::Api {
            endpoint: url.to_string(),
            errors: errors.clone(),
        });
    }

    Ok(value)
}
