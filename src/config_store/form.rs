//! Capture parameter form
//!
//! Text fields as the operator typed them. Parsing happens only when the
//! form is turned into [`ConfigEdits`], so half-typed values never reach
//! the device.

use super::types::ConfigEdits;
use crate::error::{Error, Result};
use crate::models::Configuration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Quality shown when the backend did not report one
pub const DEFAULT_IMAGE_QUALITY: i32 = 80;

/// Editable capture parameters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterForm {
    pub motion_threshold: String,
    pub time_lapse_duration: String,
    pub time_between_snaps: String,
    pub image_quality: String,
    pub timezone: String,
}

impl ParameterForm {
    /// Populate the form from a loaded document
    pub fn from_config(config: &Configuration) -> Self {
        let quality = if config.image_quality > 0 {
            config.image_quality
        } else {
            DEFAULT_IMAGE_QUALITY
        };

        Self {
            motion_threshold: config.motion_threshold.to_string(),
            time_lapse_duration: config.time_lapse_duration.to_string(),
            time_between_snaps: config.time_between_snaps.to_string(),
            image_quality: quality.to_string(),
            timezone: config.timezone.clone(),
        }
    }

    /// Field names accepted by [`ParameterForm::set`]
    pub fn field_names() -> [&'static str; 5] {
        [
            "motion_threshold",
            "time_lapse_duration",
            "time_between_snaps",
            "image_quality",
            "timezone",
        ]
    }

    /// Set one field by name
    pub fn set(&mut self, field: &str, value: &str) -> Result<()> {
        let slot = match field {
            "motion_threshold" => &mut self.motion_threshold,
            "time_lapse_duration" => &mut self.time_lapse_duration,
            "time_between_snaps" => &mut self.time_between_snaps,
            "image_quality" => &mut self.image_quality,
            "timezone" => &mut self.timezone,
            other => {
                return Err(Error::Validation(format!(
                    "unknown field '{}' (one of: {})",
                    other,
                    Self::field_names().join(", ")
                )));
            }
        };
        *slot = value.trim().to_string();
        Ok(())
    }

    /// Parse and validate every field
    pub fn to_edits(&self) -> Result<ConfigEdits> {
        let motion_threshold = parse_int("motion_threshold", &self.motion_threshold)?;
        if motion_threshold < 0 {
            return Err(Error::Validation(
                "motion_threshold must not be negative".to_string(),
            ));
        }

        let time_lapse_duration = parse_int("time_lapse_duration", &self.time_lapse_duration)?;
        if time_lapse_duration < 0 {
            return Err(Error::Validation(
                "time_lapse_duration must not be negative".to_string(),
            ));
        }

        let time_between_snaps: f64 = self
            .time_between_snaps
            .trim()
            .parse()
            .map_err(|_| invalid("time_between_snaps", &self.time_between_snaps))?;
        if !time_between_snaps.is_finite() || time_between_snaps <= 0.0 {
            return Err(Error::Validation(
                "time_between_snaps must be a positive number of seconds".to_string(),
            ));
        }

        let image_quality = parse_int("image_quality", &self.image_quality)?;
        if !(1..=100).contains(&image_quality) {
            return Err(Error::Validation(
                "image_quality must be between 1 and 100".to_string(),
            ));
        }

        let timezone = self.timezone.trim();
        if timezone.parse::<Tz>().is_err() {
            return Err(Error::Validation(format!("unknown timezone '{}'", timezone)));
        }

        Ok(ConfigEdits {
            motion_threshold: Some(motion_threshold),
            time_lapse_duration: Some(time_lapse_duration),
            time_between_snaps: Some(time_between_snaps),
            image_quality: Some(image_quality),
            timezone: Some(timezone.to_string()),
            grid_mask: None,
        })
    }
}

fn parse_int(field: &str, value: &str) -> Result<i32> {
    value.trim().parse().map_err(|_| invalid(field, value))
}

fn invalid(field: &str, value: &str) -> Error {
    Error::Validation(format!("{} has invalid value '{}'", field, value))
}
