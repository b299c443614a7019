//! ConfigStore - Device Configuration Holder
//!
//! ## Responsibilities
//!
//! - Owns the last-loaded configuration document
//! - Merge-on-write saves (edited fields over the loaded document)
//! - Reload after every acknowledged save
//!
//! ## Design Principles
//!
//! - The device is authoritative: after a save the local copy is whatever
//!   the device reports back, not what was sent
//! - Failed loads and saves never touch the local copy

mod form;
mod types;

pub use form::{ParameterForm, DEFAULT_IMAGE_QUALITY};
pub use types::*;

use crate::device_client::DeviceApi;
use crate::error::{Error, Result};
use crate::models::Configuration;
use std::sync::Arc;
use tokio::sync::RwLock;

/// ConfigStore instance
pub struct ConfigStore {
    device: Arc<dyn DeviceApi>,
    current: RwLock<Option<Configuration>>,
}

impl ConfigStore {
    /// Create new ConfigStore (nothing loaded yet)
    pub fn new(device: Arc<dyn DeviceApi>) -> Self {
        Self {
            device,
            current: RwLock::new(None),
        }
    }

    /// Fetch the document and replace the local copy wholesale.
    ///
    /// On failure the previous copy stays in place.
    pub async fn load(&self) -> Result<Configuration> {
        match self.device.get_config().await {
            Ok(config) => {
                *self.current.write().await = Some(config.clone());
                tracing::info!(
                    grid_rows = config.grid_rows,
                    grid_cols = config.grid_cols,
                    active_cells = config.grid_mask.len(),
                    "Configuration loaded"
                );
                Ok(config)
            }
            Err(e) => {
                tracing::error!(error = %e, "Error fetching config");
                Err(e)
            }
        }
    }

    /// Submit `edits` merged over the last-loaded document, then reload.
    ///
    /// The reload only starts once the save is acknowledged. A failed save
    /// leaves the local copy as it was; there is no retry.
    pub async fn save(&self, edits: ConfigEdits) -> Result<SaveOutcome> {
        let base = self.current().await.ok_or(Error::NotLoaded)?;
        let submitted = edits.apply_to(&base)?;

        if let Err(e) = self.device.post_config(&submitted).await {
            tracing::error!(error = %e, "Failed to save config");
            return Err(e);
        }

        tracing::info!(active_cells = submitted.grid_mask.len(), "Configuration saved");

        let reconciled = match self.load().await {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(error = %e, "Saved config could not be read back");
                None
            }
        };

        Ok(SaveOutcome {
            submitted,
            reconciled,
        })
    }

    /// Last-loaded document
    pub async fn current(&self) -> Option<Configuration> {
        self.current.read().await.clone()
    }
}
