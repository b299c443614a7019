//! ControlActions - Start/Stop Commands
//!
//! Commands are fire-and-confirm: the panel never flips its own buttons.
//! After every command (success or failure) one extra status tick is
//! requested and that tick decides what the operator sees.

use crate::device_client::DeviceApi;
use crate::error::Result;
use crate::panel_hub::{PanelHub, PanelMessage};
use crate::status_poller::StatusPoller;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Monitoring commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Start,
    Stop,
}

impl Command {
    fn failure_message(&self) -> &'static str {
        match self {
            Command::Start => "Failed to start monitoring",
            Command::Stop => "Failed to stop monitoring",
        }
    }
}

/// ControlActions instance
pub struct ControlActions {
    device: Arc<dyn DeviceApi>,
    poller: Arc<StatusPoller>,
    hub: Arc<PanelHub>,
}

impl ControlActions {
    pub fn new(device: Arc<dyn DeviceApi>, poller: Arc<StatusPoller>, hub: Arc<PanelHub>) -> Self {
        Self { device, poller, hub }
    }

    /// Arm motion monitoring
    pub async fn start(&self) -> Result<()> {
        self.run(Command::Start).await
    }

    /// Disarm motion monitoring
    pub async fn stop(&self) -> Result<()> {
        self.run(Command::Stop).await
    }

    /// Issue `command`, report failures to the operator, then request a
    /// status tick
    pub async fn run(&self, command: Command) -> Result<()> {
        let result = match command {
            Command::Start => self.device.start_monitoring().await,
            Command::Stop => self.device.stop_monitoring().await,
        };

        match &result {
            Ok(()) => tracing::info!(command = ?command, "Command accepted"),
            Err(e) => {
                tracing::error!(command = ?command, error = %e, "Command failed");
                self.hub
                    .publish(PanelMessage::blocking(command.failure_message()))
                    .await;
            }
        }

        self.poller.request_tick();
        result
    }
}
