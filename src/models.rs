//! Shared models for the device API
//!
//! Wire documents exchanged with the camera backend. Types used by a
//! single module live next to that module instead.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Device configuration document (`GET/POST /api/config`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub motion_threshold: i32,
    /// Seconds of time-lapse capture after motion
    pub time_lapse_duration: i32,
    /// Seconds between time-lapse frames
    pub time_between_snaps: f64,
    /// JPEG quality 1-100 (0 when the backend omitted it)
    #[serde(default)]
    pub image_quality: i32,
    pub timezone: String,
    pub grid_rows: u32,
    pub grid_cols: u32,
    /// Active zone indices, row-major
    #[serde(default)]
    pub grid_mask: BTreeSet<u32>,
    /// Settings this panel does not edit; passed through on save
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Configuration {
    /// Number of cells in the zone grid
    pub fn cell_count(&self) -> u32 {
        self.grid_rows.saturating_mul(self.grid_cols)
    }

    /// Whether `index` addresses a cell of the current grid
    pub fn is_valid_cell(&self, index: u32) -> bool {
        index < self.cell_count()
    }
}

/// Live device status (`GET /api/status`), replaced wholesale every poll
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceStatus {
    /// Capture loop alive
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub monitoring_enabled: bool,
    #[serde(default)]
    pub recording: bool,
    /// Backend is a simulated/dev instance
    #[serde(default)]
    pub mock_mode: bool,
    #[serde(default)]
    pub camera_error: Option<String>,
}

/// One captured image (`GET /api/images`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageEntry {
    pub filename: String,
    pub url: String,
}

/// Backend log buffer (`GET /api/logs`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LogsResponse {
    #[serde(default)]
    pub logs: Vec<String>,
}
