//! ConfigStore data types
//!
//! Partial edits and save results for the configuration document

use crate::error::{Error, Result};
use crate::models::Configuration;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Fields the panel edits. `None` leaves the loaded value untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigEdits {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motion_threshold: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_lapse_duration: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_between_snaps: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_quality: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid_mask: Option<BTreeSet<u32>>,
}

impl ConfigEdits {
    /// Edits that only replace the zone mask
    pub fn mask_only(mask: impl IntoIterator<Item = u32>) -> Self {
        Self {
            grid_mask: Some(mask.into_iter().collect()),
            ..Default::default()
        }
    }

    /// Attach the editor's working mask
    pub fn with_mask(mut self, mask: impl IntoIterator<Item = u32>) -> Self {
        self.grid_mask = Some(mask.into_iter().collect());
        self
    }

    /// Build the full document to submit: edited fields win, every other
    /// field (including ones this panel does not know) passes through.
    ///
    /// Mask indices must address cells of `base`'s grid.
    pub fn apply_to(&self, base: &Configuration) -> Result<Configuration> {
        let mut merged = base.clone();

        if let Some(v) = self.motion_threshold {
            merged.motion_threshold = v;
        }
        if let Some(v) = self.time_lapse_duration {
            merged.time_lapse_duration = v;
        }
        if let Some(v) = self.time_between_snaps {
            merged.time_between_snaps = v;
        }
        if let Some(v) = self.image_quality {
            merged.image_quality = v;
        }
        if let Some(ref v) = self.timezone {
            merged.timezone = v.clone();
        }
        if let Some(ref mask) = self.grid_mask {
            if let Some(bad) = mask.iter().find(|i| !base.is_valid_cell(**i)) {
                return Err(Error::Validation(format!(
                    "zone {} outside {}x{} grid",
                    bad, base.grid_rows, base.grid_cols
                )));
            }
            merged.grid_mask = mask.clone();
        }

        Ok(merged)
    }
}

/// Result of a successful save
#[derive(Debug, Clone, PartialEq)]
pub struct SaveOutcome {
    /// Document that was submitted and acknowledged
    pub submitted: Configuration,
    /// Document read back afterwards; `None` if that reload failed
    pub reconciled: Option<Configuration>,
}

impl SaveOutcome {
    /// Best known view of what the device holds now
    pub fn effective(&self) -> &Configuration {
        self.reconciled.as_ref().unwrap_or(&self.submitted)
    }
}
