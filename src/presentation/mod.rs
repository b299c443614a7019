//! Presentation state derived from device status
//!
//! The device reports `recording` and `monitoring_enabled` as two
//! independent flags. The panel shows exactly one base state, chosen in
//! priority order Recording > Monitoring > Idle. Error and mock markers are
//! overlays that combine with any base state.

use crate::models::DeviceStatus;
use serde::{Deserialize, Serialize};

/// Appended to the label when the backend runs in simulation mode
pub const MOCK_MARKER: &str = " (DEV/MOCK)";

/// Label shown while the status endpoint is unreachable
pub const DISCONNECTED_LABEL: &str = "Disconnected";

/// Mutually exclusive base state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BaseState {
    Recording,
    Monitoring,
    Idle,
}

impl BaseState {
    /// Pick the base state for a status snapshot
    pub fn derive(status: &DeviceStatus) -> Self {
        if status.recording {
            BaseState::Recording
        } else if status.monitoring_enabled {
            BaseState::Monitoring
        } else {
            BaseState::Idle
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BaseState::Recording => "RECORDING TIME-LAPSE",
            BaseState::Monitoring => "Monitoring Active",
            BaseState::Idle => "Idle (Monitoring Stopped)",
        }
    }

    pub fn accent(&self) -> Accent {
        match self {
            BaseState::Recording => Accent::Red,
            BaseState::Monitoring => Accent::Green,
            BaseState::Idle => Accent::Grey,
        }
    }

    pub fn controls(&self) -> ControlVisibility {
        match self {
            BaseState::Recording | BaseState::Monitoring => ControlVisibility {
                start_visible: false,
                stop_visible: true,
            },
            BaseState::Idle => ControlVisibility {
                start_visible: true,
                stop_visible: false,
            },
        }
    }
}

/// Status indicator color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Accent {
    Red,
    Green,
    Grey,
}

impl Accent {
    pub fn hex(&self) -> &'static str {
        match self {
            Accent::Red => "#ff4757",
            Accent::Green => "#00ff9d",
            Accent::Grey => "#7f8c8d",
        }
    }
}

/// Which of the Start/Stop buttons is offered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlVisibility {
    pub start_visible: bool,
    pub stop_visible: bool,
}

/// Whether the last status fetch reached the device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Connection {
    /// No tick has completed yet
    Pending,
    Connected,
    Disconnected,
}

/// Everything the panel displays about device state
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Presentation {
    pub base: BaseState,
    pub label: String,
    pub accent: Accent,
    pub controls: ControlVisibility,
    /// Raw `camera_error` text; banner hidden when `None`
    pub error_banner: Option<String>,
    pub mock_mode: bool,
    pub connection: Connection,
}

impl Presentation {
    /// State shown before the first poll completes
    pub fn initial() -> Self {
        let base = BaseState::Idle;
        Self {
            base,
            label: "Ready".to_string(),
            accent: base.accent(),
            controls: base.controls(),
            error_banner: None,
            mock_mode: false,
            connection: Connection::Pending,
        }
    }

    /// Derive the full presentation from one status snapshot
    pub fn derive(status: &DeviceStatus) -> Self {
        let base = BaseState::derive(status);

        let mut label = base.label().to_string();
        if status.mock_mode {
            label.push_str(MOCK_MARKER);
        }

        Self {
            base,
            label,
            accent: base.accent(),
            controls: base.controls(),
            error_banner: status.camera_error.clone(),
            mock_mode: status.mock_mode,
            connection: Connection::Connected,
        }
    }

    /// Failed fetch: only the label changes, everything else stays at the
    /// last known-good values
    pub fn disconnected(&self) -> Self {
        Self {
            label: DISCONNECTED_LABEL.to_string(),
            connection: Connection::Disconnected,
            ..self.clone()
        }
    }

    /// Banner text as displayed to the operator
    pub fn banner_text(&self) -> Option<String> {
        self.error_banner
            .as_ref()
            .map(|e| format!("Camera Error: {}", e))
    }
}

impl Default for Presentation {
    fn default() -> Self {
        Self::initial()
    }
}
