//! GalleryService - Captured Image Listing
//!
//! Thin wrapper over the capture endpoints. Listing order is the
//! backend's (newest first). Every image URL carries a freshness token so
//! an intermediate cache never serves an older capture under the same name.

use crate::device_client::DeviceApi;
use crate::error::Result;
use crate::models::ImageEntry;
use crate::panel_hub::{GalleryUpdatedMessage, PanelHub, PanelMessage};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;

/// Default gallery refresh cadence
pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(5);

/// Gallery entry ready for display
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryImage {
    pub filename: String,
    /// Absolute URL with freshness token
    pub url: String,
}

/// Append `t=<token>` to `url`
pub fn with_freshness_token(url: &str, token: i64) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}t={}", url, sep, token)
}

/// GalleryService instance
pub struct GalleryService {
    device: Arc<dyn DeviceApi>,
    hub: Arc<PanelHub>,
    images: RwLock<Vec<GalleryImage>>,
}

impl GalleryService {
    pub fn new(device: Arc<dyn DeviceApi>, hub: Arc<PanelHub>) -> Self {
        Self {
            device,
            hub,
            images: RwLock::new(Vec::new()),
        }
    }

    /// Re-list captures. On failure the previous listing is kept.
    pub async fn refresh(&self) -> Result<Vec<GalleryImage>> {
        let entries = match self.device.list_images().await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(error = %e, "Gallery load error");
                return Err(e);
            }
        };

        let token = chrono::Utc::now().timestamp_millis();
        let images: Vec<GalleryImage> = entries
            .into_iter()
            .map(|ImageEntry { filename, url }| GalleryImage {
                url: with_freshness_token(&self.device.resolve_url(&url), token),
                filename,
            })
            .collect();

        *self.images.write().await = images.clone();

        self.hub
            .publish(PanelMessage::GalleryUpdated(GalleryUpdatedMessage {
                image_count: images.len(),
                latest: images.first().map(|i| i.filename.clone()),
                timestamp: chrono::Utc::now().to_rfc3339(),
            }))
            .await;

        Ok(images)
    }

    /// Delete every capture on the device, then re-list
    pub async fn delete_all(&self) -> Result<Vec<GalleryImage>> {
        self.device.delete_all_images().await?;
        tracing::info!("All captures deleted");
        self.refresh().await
    }

    /// Save the capture archive to `path`; returns the archive size
    pub async fn download_archive(&self, path: &Path) -> Result<usize> {
        let archive = self.device.download_images().await?;
        tokio::fs::write(path, &archive).await?;
        tracing::info!(path = %path.display(), bytes = archive.len(), "Capture archive saved");
        Ok(archive.len())
    }

    /// Last listing
    pub async fn images(&self) -> Vec<GalleryImage> {
        self.images.read().await.clone()
    }

    /// Refresh on a fixed cadence until the handle is aborted
    pub fn start(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                // failures are logged in refresh
                let _ = self.refresh().await;
                tokio::time::sleep(every).await;
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeDevice;

    fn entry(name: &str) -> ImageEntry {
        ImageEntry {
            filename: name.to_string(),
            url: format!("/captures/{}", name),
        }
    }

    fn service(device: &Arc<FakeDevice>) -> (Arc<PanelHub>, GalleryService) {
        let hub = Arc::new(PanelHub::new());
        (hub.clone(), GalleryService::new(device.clone(), hub))
    }

    #[test]
    fn test_freshness_token() {
        assert_eq!(with_freshness_token("/a.jpg", 17), "/a.jpg?t=17");
        assert_eq!(with_freshness_token("/a.jpg?s=1", 17), "/a.jpg?s=1&t=17");
    }

    #[tokio::test]
    async fn test_refresh_keeps_order_and_busts_cache() {
        let device = Arc::new(FakeDevice::new());
        device.set_images(vec![entry("b.jpg"), entry("a.jpg")]);
        let (hub, gallery) = service(&device);
        let (_id, mut rx) = hub.subscribe().await;

        let images = gallery.refresh().await.unwrap();
        assert_eq!(images[0].filename, "b.jpg");
        assert!(images[0]
            .url
            .starts_with("http://device.test/captures/b.jpg?t="));

        match rx.try_recv() {
            Ok(PanelMessage::GalleryUpdated(m)) => {
                assert_eq!(m.image_count, 2);
                assert_eq!(m.latest.as_deref(), Some("b.jpg"));
            }
            other => panic!("expected gallery update, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_previous_listing() {
        let device = Arc::new(FakeDevice::new());
        device.set_images(vec![entry("a.jpg")]);
        let (_hub, gallery) = service(&device);
        gallery.refresh().await.unwrap();

        device.fail_gallery(true);
        assert!(gallery.refresh().await.is_err());
        assert_eq!(gallery.images().await.len(), 1);
    }

    #[tokio::test]
    async fn test_delete_all_relists() {
        let device = Arc::new(FakeDevice::new());
        device.set_images(vec![entry("a.jpg")]);
        let (_hub, gallery) = service(&device);
        gallery.refresh().await.unwrap();

        let images = gallery.delete_all().await.unwrap();
        assert!(images.is_empty());
        assert!(gallery.images().await.is_empty());
    }

    #[tokio::test]
    async fn test_download_archive_writes_file() {
        let device = Arc::new(FakeDevice::new());
        device.set_archive(b"PK\x03\x04zip".to_vec());
        let (_hub, gallery) = service(&device);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("captures.zip");
        let size = gallery.download_archive(&path).await.unwrap();

        assert_eq!(size, 7);
        assert_eq!(std::fs::read(&path).unwrap(), b"PK\x03\x04zip");
    }
}
