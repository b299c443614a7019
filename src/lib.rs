//! Motion Camera Control Panel Library
//!
//! Operator panel for a motion-activated, time-lapse camera device.
//!
//! ## Architecture (8 Components)
//!
//! 1. DeviceClient - HTTP adapter for the device API
//! 2. ConfigStore - Last-loaded configuration, merge-on-write saves
//! 3. GridMaskEditor - Active zone cells over the live feed
//! 4. ControlPanel - Form + zone editor workflow on top of ConfigStore
//! 5. StatusPoller - Fixed-cadence status reconciliation (single-flight)
//! 6. ControlActions - Start/stop commands with immediate re-poll
//! 7. GalleryService / LogViewer - Capture listing and backend logs
//! 8. PanelHub - Fan-out of panel updates to views
//!
//! ## Design Principles
//!
//! - The device is the source of truth for status and configuration
//! - Presentation is a pure function of the latest status snapshot
//! - No error stops the status poll loop

pub mod config_store;
pub mod console;
pub mod control;
pub mod device_client;
pub mod gallery;
pub mod grid_mask;
pub mod log_viewer;
pub mod models;
pub mod panel;
pub mod panel_hub;
pub mod presentation;
pub mod status_poller;
pub mod error;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, Result};
pub use state::AppState;
