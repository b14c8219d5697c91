//! Remote document and tile fetching.

use std::collections::HashMap;

use async_trait::async_trait;
use bytes::Bytes;
use feed_protocol::media_types;
use quake_common::{QuakeError, QuakeResult};
use reqwest::{header, Client};
use tracing::{debug, instrument};

use crate::config::HttpConfig;

/// Something that can GET a URL and hand back the body.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the full response body for `url`.
    async fn fetch(&self, url: &str) -> QuakeResult<Bytes>;
}

/// HTTP source backed by a shared reqwest client.
pub struct HttpFeedSource {
    client: Client,
    accept: String,
}

impl HttpFeedSource {
    pub fn new(config: &HttpConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            accept: accept_header(),
        })
    }
}

/// Prefer GeoJSON, then plain JSON. Tiles go through the same client, so anything else is still accepted.
fn accept_header() -> String {
    format!(
        "{}, {};q=0.9, */*;q=0.8",
        media_types::GEO_JSON,
        media_types::JSON
    )
}

#[async_trait]
impl FeedSource for HttpFeedSource {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> QuakeResult<Bytes> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, self.accept.as_str())
            .send()
            .await
            .map_err(|e| request_error(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QuakeError::UpstreamStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| request_error(url, e))?;
        debug!(bytes = body.len(), "Fetched document");
        Ok(body)
    }
}

fn request_error(url: &str, err: reqwest::Error) -> QuakeError {
    if err.is_timeout() {
        QuakeError::Timeout
    } else {
        QuakeError::FetchFailed {
            url: url.to_string(),
            message: err.to_string(),
        }
    }
}

/// In-memory source keyed by URL. Unknown URLs fail like an unreachable host.
#[derive(Debug, Default, Clone)]
pub struct MemoryFeedSource {
    documents: HashMap<String, Bytes>,
}

impl MemoryFeedSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_document(mut self, url: impl Into<String>, body: impl Into<Bytes>) -> Self {
        self.documents.insert(url.into(), body.into());
        self
    }
}

#[async_trait]
impl FeedSource for MemoryFeedSource {
    async fn fetch(&self, url: &str) -> QuakeResult<Bytes> {
        self.documents
            .get(url)
            .cloned()
            .ok_or_else(|| QuakeError::FetchFailed {
                url: url.to_string(),
                message: "connection refused".to_string(),
            })
    }
}
