//! ControlPanel - Configuration Editing Workflow
//!
//! ## Responsibilities
//!
//! - Ties the parameter form and the zone editor to the ConfigStore
//! - Reload: fetch, re-render the grid, repopulate the form
//! - Save: form + working mask merged over the loaded document
//!
//! A reload always replaces the editor's working mask and the form
//! contents with what the device returned; unsaved edits do not survive it.

use crate::config_store::{ConfigStore, ParameterForm, SaveOutcome};
use crate::error::Result;
use crate::grid_mask::GridMaskEditor;
use crate::models::Configuration;
use crate::panel_hub::{ConfigLoadedMessage, PanelHub, PanelMessage};
use std::sync::Arc;
use tokio::sync::Mutex;

/// ControlPanel instance
pub struct ControlPanel {
    config_store: Arc<ConfigStore>,
    editor: Mutex<GridMaskEditor>,
    form: Mutex<ParameterForm>,
    hub: Arc<PanelHub>,
}

impl ControlPanel {
    pub fn new(config_store: Arc<ConfigStore>, hub: Arc<PanelHub>) -> Self {
        Self {
            config_store,
            editor: Mutex::new(GridMaskEditor::new()),
            form: Mutex::new(ParameterForm::default()),
            hub,
        }
    }

    /// Load the configuration and rebuild form and grid from it.
    ///
    /// A failed load is logged by the store and leaves everything as is.
    /// So does a document whose grid the editor cannot lay out.
    pub async fn reload(&self) -> Result<Configuration> {
        let config = self.config_store.load().await?;
        self.apply_loaded(&config).await?;
        Ok(config)
    }

    /// Save form values and the working mask, then show what the device
    /// stored. On failure the form and mask keep the operator's edits.
    pub async fn save(&self) -> Result<SaveOutcome> {
        let parsed = self.form.lock().await.to_edits();
        let edits = match parsed {
            Ok(edits) => edits,
            Err(e) => {
                self.hub.publish(PanelMessage::blocking(e.to_string())).await;
                return Err(e);
            }
        };
        let edits = edits.with_mask(self.editor.lock().await.export_mask());

        match self.config_store.save(edits).await {
            Ok(outcome) => {
                self.hub.publish(PanelMessage::info("Configuration Saved!")).await;
                if let Some(ref reconciled) = outcome.reconciled {
                    if let Err(e) = self.apply_loaded(reconciled).await {
                        self.hub.publish(PanelMessage::blocking(e.to_string())).await;
                    }
                }
                Ok(outcome)
            }
            Err(e) => {
                let message = if e.is_transport() {
                    "Failed to save config".to_string()
                } else {
                    e.to_string()
                };
                self.hub.publish(PanelMessage::blocking(message)).await;
                Err(e)
            }
        }
    }

    /// Toggle a zone by index; local only
    pub async fn toggle_zone(&self, index: u32) -> Result<bool> {
        self.editor.lock().await.toggle(index)
    }

    /// Toggle a zone by grid coordinates; local only
    pub async fn toggle_cell(&self, row: u32, col: u32) -> Result<bool> {
        self.editor.lock().await.toggle_at(row, col)
    }

    /// Edit one parameter field; local only
    pub async fn set_field(&self, field: &str, value: &str) -> Result<()> {
        self.form.lock().await.set(field, value)
    }

    pub async fn form(&self) -> ParameterForm {
        self.form.lock().await.clone()
    }

    /// Working mask
    pub async fn mask(&self) -> Vec<u32> {
        self.editor.lock().await.export_mask()
    }

    /// Text view of the zone grid
    pub async fn grid_text(&self) -> String {
        self.editor.lock().await.render_text()
    }

    async fn apply_loaded(&self, config: &Configuration) -> Result<()> {
        let active_cells = {
            let mut editor = self.editor.lock().await;
            if let Err(e) = editor.render(
                config.grid_rows,
                config.grid_cols,
                config.grid_mask.iter().copied(),
            ) {
                tracing::error!(error = %e, "Configuration grid rejected");
                return Err(e);
            }
            editor.export_mask().len()
        };
        *self.form.lock().await = ParameterForm::from_config(config);

        self.hub
            .publish(PanelMessage::ConfigLoaded(ConfigLoadedMessage {
                grid_rows: config.grid_rows,
                grid_cols: config.grid_cols,
                active_cells,
                timestamp: chrono::Utc::now().to_rfc3339(),
            }))
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::panel_hub::NotificationLevel;
    use crate::testing::{sample_config, FakeDevice};

    fn panel(device: &Arc<FakeDevice>) -> (Arc<PanelHub>, ControlPanel) {
        let hub = Arc::new(PanelHub::new());
        let store = Arc::new(ConfigStore::new(device.clone()));
        (hub.clone(), ControlPanel::new(store, hub))
    }

    fn blocking_messages(rx: &mut tokio::sync::mpsc::UnboundedReceiver<PanelMessage>) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(msg) = rx.try_recv() {
            if let PanelMessage::Notification(n) = msg {
                if n.level == NotificationLevel::Blocking {
                    out.push(n.message);
                }
            }
        }
        out
    }

    #[tokio::test]
    async fn test_reload_seeds_grid_and_form() {
        let mut config = sample_config();
        config.grid_mask = [2, 9].into_iter().collect();
        config.image_quality = 0;
        let device = Arc::new(FakeDevice::with_config(config));
        let (_hub, panel) = panel(&device);

        panel.reload().await.unwrap();
        assert_eq!(panel.mask().await, vec![2, 9]);
        assert_eq!(panel.form().await.image_quality, "80");
        assert_eq!(panel.grid_text().await.lines().count(), 6);
    }

    #[tokio::test]
    async fn test_toggles_are_local_until_save() {
        let device = Arc::new(FakeDevice::new());
        let (_hub, panel) = panel(&device);
        panel.reload().await.unwrap();

        panel.toggle_zone(0).await.unwrap();
        panel.toggle_cell(0, 5).await.unwrap();
        panel.toggle_zone(12).await.unwrap();
        assert!(device.posted().is_empty());

        let outcome = panel.save().await.unwrap();
        assert_eq!(
            outcome.reconciled.unwrap().grid_mask.into_iter().collect::<Vec<_>>(),
            vec![0, 5, 12]
        );
        assert_eq!(panel.mask().await, vec![0, 5, 12]);
        assert_eq!(device.posted().len(), 1);
    }

    #[tokio::test]
    async fn test_reload_discards_unsaved_toggles() {
        let device = Arc::new(FakeDevice::new());
        let (_hub, panel) = panel(&device);
        panel.reload().await.unwrap();

        panel.toggle_zone(3).await.unwrap();
        panel.set_field("motion_threshold", "99").await.unwrap();
        panel.reload().await.unwrap();

        assert!(panel.mask().await.is_empty());
        assert_eq!(panel.form().await.motion_threshold, "20");
    }

    #[tokio::test]
    async fn test_oversized_grid_keeps_previous_editor() {
        let device = Arc::new(FakeDevice::new());
        let (_hub, panel) = panel(&device);
        panel.reload().await.unwrap();
        panel.toggle_zone(7).await.unwrap();

        let mut corrupt = sample_config();
        corrupt.grid_rows = 65536;
        corrupt.grid_cols = 65536;
        device.set_config(corrupt);

        assert!(matches!(panel.reload().await, Err(Error::Validation(_))));
        assert_eq!(panel.mask().await, vec![7]);
        assert_eq!(panel.grid_text().await.lines().count(), 6);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits_and_notifies() {
        let device = Arc::new(FakeDevice::new());
        let (hub, panel) = panel(&device);
        let (_id, mut rx) = hub.subscribe().await;
        panel.reload().await.unwrap();

        panel.toggle_zone(4).await.unwrap();
        panel.set_field("motion_threshold", "33").await.unwrap();
        device.fail_config_post(true);

        assert!(panel.save().await.is_err());
        assert_eq!(panel.mask().await, vec![4]);
        assert_eq!(panel.form().await.motion_threshold, "33");
        assert_eq!(blocking_messages(&mut rx), vec!["Failed to save config"]);
        assert_eq!(device.stored_config(), sample_config());
    }

    #[tokio::test]
    async fn test_invalid_form_is_not_sent() {
        let device = Arc::new(FakeDevice::new());
        let (hub, panel) = panel(&device);
        let (_id, mut rx) = hub.subscribe().await;
        panel.reload().await.unwrap();

        panel.set_field("image_quality", "0").await.unwrap();
        assert!(matches!(panel.save().await, Err(Error::Validation(_))));
        assert!(device.posted().is_empty());
        assert_eq!(blocking_messages(&mut rx).len(), 1);
    }
}
