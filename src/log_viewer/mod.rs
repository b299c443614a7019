//! LogViewer - Backend Log Display
//!
//! Fetch failures are shown in place of the log lines; they are not
//! operator notifications.

use crate::device_client::DeviceApi;
use crate::panel_hub::{LogsMessage, PanelHub, PanelMessage};
use std::sync::Arc;

/// Text shown when the log fetch fails
pub const LOAD_FAILED: &str = "Failed to load logs.";

/// LogViewer instance
pub struct LogViewer {
    device: Arc<dyn DeviceApi>,
    hub: Arc<PanelHub>,
}

impl LogViewer {
    pub fn new(device: Arc<dyn DeviceApi>, hub: Arc<PanelHub>) -> Self {
        Self { device, hub }
    }

    /// Fetch and publish the backend log buffer
    pub async fn refresh(&self) -> LogsMessage {
        let message = match self.device.get_logs().await {
            Ok(lines) => LogsMessage { lines, error: None },
            Err(e) => {
                tracing::warn!(error = %e, "Log fetch failed");
                LogsMessage {
                    lines: Vec::new(),
                    error: Some(LOAD_FAILED.to_string()),
                }
            }
        };

        self.hub.publish(PanelMessage::Logs(message.clone())).await;
        message
    }
}
