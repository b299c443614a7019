//! Application state
//!
//! Holds all shared components and the panel configuration

use crate::config_store::ConfigStore;
use crate::control::ControlActions;
use crate::device_client::{DeviceApi, DeviceClient};
use crate::gallery::GalleryService;
use crate::log_viewer::LogViewer;
use crate::panel::ControlPanel;
use crate::panel_hub::PanelHub;
use crate::status_poller::StatusPoller;
use std::sync::Arc;
use std::time::Duration;

/// Panel configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Device backend URL
    pub device_url: String,
    /// Status poll cadence
    pub status_poll_interval: Duration,
    /// Gallery refresh cadence
    pub gallery_poll_interval: Duration,
    /// Per-request HTTP timeout
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device_url: std::env::var("DEVICE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8888".to_string()),
            status_poll_interval: Duration::from_millis(env_u64("STATUS_POLL_MS", 2000)),
            gallery_poll_interval: Duration::from_millis(env_u64("GALLERY_POLL_MS", 5000)),
            http_timeout: Duration::from_secs(env_u64("HTTP_TIMEOUT_SEC", 10)),
        }
    }
}

/// Numeric env var with fallback; zero and garbage fall back too
fn env_u64(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse::<u64>() {
            Ok(v) if v > 0 => v,
            _ => {
                tracing::warn!(key, value = %raw, default, "Invalid setting, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Application state shared by the console and background tasks
#[derive(Clone)]
pub struct AppState {
    /// Panel config
    pub config: AppConfig,
    /// Device API (HTTP in production)
    pub device: Arc<dyn DeviceApi>,
    /// PanelHub (update fan-out)
    pub hub: Arc<PanelHub>,
    /// ConfigStore (device configuration)
    pub config_store: Arc<ConfigStore>,
    /// ControlPanel (form + zone editor)
    pub panel: Arc<ControlPanel>,
    /// StatusPoller (presentation reconciliation)
    pub poller: Arc<StatusPoller>,
    /// ControlActions (start/stop)
    pub controls: Arc<ControlActions>,
    /// GalleryService (captures)
    pub gallery: Arc<GalleryService>,
    /// LogViewer (backend logs)
    pub logs: Arc<LogViewer>,
}

impl AppState {
    /// Wire everything against the HTTP device client
    pub fn new(config: AppConfig) -> crate::Result<Self> {
        let device: Arc<dyn DeviceApi> = Arc::new(DeviceClient::with_timeout(
            config.device_url.clone(),
            config.http_timeout,
        )?);
        Ok(Self::with_device(config, device))
    }

    /// Wire everything against any device implementation
    pub fn with_device(config: AppConfig, device: Arc<dyn DeviceApi>) -> Self {
        let hub = Arc::new(PanelHub::new());
        let config_store = Arc::new(ConfigStore::new(device.clone()));
        let panel = Arc::new(ControlPanel::new(config_store.clone(), hub.clone()));
        let poller = Arc::new(StatusPoller::with_interval(
            device.clone(),
            hub.clone(),
            config.status_poll_interval,
        ));
        let controls = Arc::new(ControlActions::new(device.clone(), poller.clone(), hub.clone()));
        let gallery = Arc::new(GalleryService::new(device.clone(), hub.clone()));
        let logs = Arc::new(LogViewer::new(device.clone(), hub.clone()));

        Self {
            config,
            device,
            hub,
            config_store,
            panel,
            poller,
            controls,
            gallery,
            logs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presentation::BaseState;
    use crate::testing::FakeDevice;

    fn test_config() -> AppConfig {
        AppConfig {
            device_url: "http://device.test".to_string(),
            status_poll_interval: Duration::from_secs(2),
            gallery_poll_interval: Duration::from_secs(5),
            http_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn test_env_u64_fallback() {
        assert_eq!(env_u64("MOTIONCAM_PANEL_TEST_UNSET_KEY", 7), 7);
    }

    #[test]
    fn test_new_builds_http_client() {
        let state = AppState::new(test_config()).unwrap();
        assert_eq!(state.device.resolve_url("/x"), "http://device.test/x");
        assert_eq!(state.poller.interval(), Duration::from_secs(2));
    }

    #[test]
    fn test_bad_device_url_is_config_error() {
        let config = AppConfig {
            device_url: "camera.local".to_string(),
            ..test_config()
        };
        assert!(matches!(
            AppState::new(config),
            Err(crate::Error::Config(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_wired_components_share_device() {
        let device = Arc::new(FakeDevice::new());
        let state = AppState::with_device(test_config(), device.clone());

        state.panel.reload().await.unwrap();
        let _handle = state.poller.clone().start().await.unwrap();
        state.controls.start().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(state.poller.presentation().await.base, BaseState::Monitoring);
        assert!(state.config_store.current().await.is_some());
        state.poller.stop().await;
    }
}
