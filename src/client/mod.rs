//! HTTP access to the content service.
//!
//! [`ContentClient`] wraps a [`reqwest::Client`] and normalizes every failure
//! mode (network, non-success status, malformed envelope) into a uniform
//! [`TransportError`] so nothing transport-specific leaks to callers. Every
//! request passes through a pre-request hook (identity by default, the place
//! to inject auth headers) and a post-response step that unwraps the
//! `{data: ...}` envelope. The client never retries; callers decide.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

use crate::config::ApiConfig;

/// Hook applied to every outgoing request before it is sent.
pub type RequestHook = Arc<dyn Fn(RequestBuilder) -> RequestBuilder + Send + Sync>;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} from {url}")]
    Status { status: StatusCode, url: String },

    #[error("malformed response envelope: {0}")]
    Envelope(String),

    #[error("invalid api base url: {0}")]
    BaseUrl(String),
}

/// Wire envelope distinguishing payload from transport-level status.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    data: Option<T>,
}

pub struct ContentClient {
    http: Client,
    base_url: Url,
    posts_resource: String,
    request_hook: Option<RequestHook>,
}

impl ContentClient {
    pub fn new(config: &ApiConfig) -> Result<Self, TransportError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            .brotli(true)
            .user_agent(concat!("galley/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let base_url = Url::parse(&config.base_url)
            .map_err(|e| TransportError::BaseUrl(format!("{}: {e}", config.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(TransportError::BaseUrl(config.base_url.clone()));
        }

        Ok(Self {
            http,
            base_url,
            posts_resource: config.posts_resource.clone(),
            request_hook: None,
        })
    }

    /// Replaces the identity pre-request hook.
    pub fn with_request_hook(mut self, hook: RequestHook) -> Self {
        self.request_hook = Some(hook);
        self
    }

    /// Resource the post list/detail endpoints live under, e.g. `v1/posts`.
    pub fn posts_resource(&self) -> &str {
        &self.posts_resource
    }

    /// Fetches a paginated list: `GET {base}/{resource}?page=&page_size=`.
    pub async fn fetch_list<T: DeserializeOwned>(
        &self,
        resource: &str,
        page: u32,
        page_size: u32,
    ) -> Result<T, TransportError> {
        self.request(self.list_url(resource, page, page_size)?).await
    }

    /// Fetches a single record: `GET {base}/{resource}/{id}`.
    pub async fn fetch_by_id<T: DeserializeOwned>(
        &self,
        resource: &str,
        id: &str,
    ) -> Result<T, TransportError> {
        self.request(self.endpoint(resource, Some(id))?).await
    }

    fn list_url(&self, resource: &str, page: u32, page_size: u32) -> Result<Url, TransportError> {
        let mut url = self.endpoint(resource, None)?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("page_size", &page_size.to_string());
        Ok(url)
    }

    fn endpoint(&self, resource: &str, id: Option<&str>) -> Result<Url, TransportError> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| TransportError::BaseUrl(self.base_url.to_string()))?;
            segments.pop_if_empty();
            segments.extend(resource.split('/').filter(|s| !s.is_empty()));
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    async fn request<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        match self.dispatch(url.clone()).await {
            Ok(payload) => Ok(payload),
            Err(err) => {
                tracing::warn!(%url, error = %err, "content service request failed");
                Err(err)
            }
        }
    }

    async fn dispatch<T: DeserializeOwned>(&self, url: Url) -> Result<T, TransportError> {
        let mut request = self.http.get(url.clone());
        if let Some(hook) = &self.request_hook {
            request = hook(request);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status,
                url: url.to_string(),
            });
        }

        let envelope: Envelope<T> = response
            .json()
            .await
            .map_err(|e| TransportError::Envelope(e.to_string()))?;
        envelope
            .data
            .ok_or_else(|| TransportError::Envelope(format!("missing `data` field from {url}")))
    }
}
