//! DeviceClient - Camera Backend Adapter
//!
//! ## Responsibilities
//!
//! - HTTP/JSON calls against the device API
//! - Non-success status mapping to `Error::Api`
//! - URL building for captures and the live feed
//!
//! Components depend on the `DeviceApi` trait rather than the concrete
//! client so they can run against an in-memory device in tests.

use crate::error::{Error, Result};
use crate::models::{Configuration, DeviceStatus, ImageEntry, LogsResponse};
use async_trait::async_trait;
use std::time::Duration;

/// Operations the panel needs from the device backend
#[async_trait]
pub trait DeviceApi: Send + Sync {
    /// `GET /api/config`
    async fn get_config(&self) -> Result<Configuration>;

    /// `POST /api/config` with the full document
    async fn post_config(&self, config: &Configuration) -> Result<()>;

    /// `POST /api/start`
    async fn start_monitoring(&self) -> Result<()>;

    /// `POST /api/stop`
    async fn stop_monitoring(&self) -> Result<()>;

    /// `GET /api/status`
    async fn get_status(&self) -> Result<DeviceStatus>;

    /// `GET /api/images`
    async fn list_images(&self) -> Result<Vec<ImageEntry>>;

    /// `POST /api/images/delete_all`
    async fn delete_all_images(&self) -> Result<()>;

    /// `GET /api/images/download` (zip archive)
    async fn download_images(&self) -> Result<Vec<u8>>;

    /// `GET /api/logs`
    async fn get_logs(&self) -> Result<Vec<String>>;

    /// Resolve a backend-relative path (e.g. `/captures/x.jpg`) to a full URL
    fn resolve_url(&self, path: &str) -> String;
}

/// reqwest implementation of [`DeviceApi`]
pub struct DeviceClient {
    client: reqwest::Client,
    base_url: String,
    timeout: Duration,
}

impl DeviceClient {
    /// Create new client with the default 10s timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(10))
    }

    /// Create new client with custom timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let host = base_url
            .strip_prefix("http://")
            .or_else(|| base_url.strip_prefix("https://"));
        if !matches!(host, Some(h) if !h.is_empty()) {
            return Err(Error::Config(format!(
                "device URL must be http(s)://host[:port], got '{}'",
                base_url
            )));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Get timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// MJPEG live feed shown under the zone grid
    pub fn video_feed_url(&self) -> String {
        self.resolve_url("/video_feed")
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post_empty(&self, path: &str) -> Result<()> {
        let resp = self.client.post(self.endpoint(path)).send().await?;
        ensure_success(resp).await?;
        Ok(())
    }
}

/// Turn a non-2xx response into `Error::Api`, keeping the body for the log
async fn ensure_success(resp: reqwest::Response) -> Result<reqwest::Response> {
    if resp.status().is_success() {
        return Ok(resp);
    }

    let status = resp.status().as_u16();
    let body = resp.text().await.unwrap_or_default();
    Err(Error::Api { status, body })
}

#[async_trait]
impl DeviceApi for DeviceClient {
    async fn get_config(&self) -> Result<Configuration> {
        let resp = self.client.get(self.endpoint("/api/config")).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json().await?)
    }

    async fn post_config(&self, config: &Configuration) -> Result<()> {
        let resp = self
            .client
            .post(self.endpoint("/api/config"))
            .json(config)
            .send()
            .await?;
        ensure_success(resp).await?;
        Ok(())
    }

    async fn start_monitoring(&self) -> Result<()> {
        self.post_empty("/api/start").await
    }

    async fn stop_monitoring(&self) -> Result<()> {
        self.post_empty("/api/stop").await
    }

    async fn get_status(&self) -> Result<DeviceStatus> {
        let resp = self.client.get(self.endpoint("/api/status")).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json().await?)
    }

    async fn list_images(&self) -> Result<Vec<ImageEntry>> {
        let resp = self.client.get(self.endpoint("/api/images")).send().await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.json().await?)
    }

    async fn delete_all_images(&self) -> Result<()> {
        self.post_empty("/api/images/delete_all").await
    }

    async fn download_images(&self) -> Result<Vec<u8>> {
        let resp = self
            .client
            .get(self.endpoint("/api/images/download"))
            .send()
            .await?;
        let resp = ensure_success(resp).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    async fn get_logs(&self) -> Result<Vec<String>> {
        let resp = self.client.get(self.endpoint("/api/logs")).send().await?;
        let resp = ensure_success(resp).await?;
        let logs: LogsResponse = resp.json().await?;
        Ok(logs.logs)
    }

    fn resolve_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        if path.starts_with('/') {
            self.endpoint(path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }
}
