use std::time::Duration;

use async_trait::async_trait;
use glint_core::{ContentState, StyleConfig, SyncError, TakeoverStatus};
use serde::de::DeserializeOwned;

/// Style endpoint, relative to the API base.
pub const STYLE_PATH: &str = "/api/style";
/// Current content endpoint.
pub const CONTENT_PATH: &str = "/api/current_qr";
/// Takeover status endpoint, used by reconciliation and overlay polling.
pub const TAKEOVER_STATUS_PATH: &str = "/api/fallback_status";

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read side of the backend API.
#[async_trait]
pub trait SyncApi: Send + Sync {
    async fn fetch_style(&self) -> Result<StyleConfig, SyncError>;
    async fn fetch_content(&self) -> Result<ContentState, SyncError>;
    async fn takeover_status(&self) -> Result<TakeoverStatus, SyncError>;
}

/// HTTP client for the backend API.
pub struct HttpSyncApi {
    client: reqwest::Client,
    base: String,
}

impl HttpSyncApi {
    pub fn new(base: impl Into<String>) -> Result<Self, SyncError> {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| SyncError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base: base.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, SyncError> {
        let url = format!("{}{}", self.base, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| SyncError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SyncError::Network(format!("{path} returned {status}")));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SyncError::MalformedPayload(e.to_string()))
    }
}

#[async_trait]
impl SyncApi for HttpSyncApi {
    async fn fetch_style(&self) -> Result<StyleConfig, SyncError> {
        self.get_json(STYLE_PATH).await
    }

    async fn fetch_content(&self) -> Result<ContentState, SyncError> {
        self.get_json(CONTENT_PATH).await
    }

    async fn takeover_status(&self) -> Result<TakeoverStatus, SyncError> {
        self.get_json(TAKEOVER_STATUS_PATH).await
    }
}
