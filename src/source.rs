use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use url::Url;

use crate::error::SearchError;
use crate::formats::VolumesResponse;

/// Where search results come from. The web app and CLI use
/// [`HttpVolumeSource`]; tests substitute scripted sources.
#[async_trait]
pub trait VolumeSource: Send + Sync {
    /// Issues one request for `url`. Non-success statuses come back as the
    /// matching [`SearchError`].
    async fn fetch(&self, url: &Url) -> Result<VolumesResponse, SearchError>;
}

#[derive(Debug, Clone)]
pub struct HttpVolumeSource {
    client: reqwest::Client,
}

impl HttpVolumeSource {
    /// No timeout is configured: a hung request stays in flight until the
    /// server gives up.
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|err| anyhow::anyhow!("build books http client: {err}"))?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl VolumeSource for HttpVolumeSource {
    async fn fetch(&self, url: &Url) -> Result<VolumesResponse, SearchError> {
        // Error text must not echo the URL: it carries the key.
        let response = self
            .client
            .get(url.clone())
            .header(USER_AGENT, concat!("bookfinder/", env!("CARGO_PKG_VERSION")))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|err| SearchError::Transport(err.without_url().to_string()))?;

        let status = response.status();
        tracing::debug!(status = status.as_u16(), "books api responded");
        if !status.is_success() {
            return Err(SearchError::from_status(status.as_u16()));
        }

        let raw = response
            .text()
            .await
            .map_err(|err| SearchError::Transport(err.without_url().to_string()))?;
        let parsed: VolumesResponse = serde_json::from_str(&raw)?;
        Ok(parsed)
    }
}
