//! In-memory device backend for unit tests

use crate::device_client::DeviceApi;
use crate::error::{Error, Result};
use crate::models::{Configuration, DeviceStatus, ImageEntry};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// 6x8 grid configuration used across tests
pub fn sample_config() -> Configuration {
    Configuration {
        motion_threshold: 20,
        time_lapse_duration: 10,
        time_between_snaps: 0.5,
        image_quality: 80,
        timezone: "US/Eastern".to_string(),
        grid_rows: 6,
        grid_cols: 8,
        grid_mask: BTreeSet::new(),
        extra: serde_json::Map::new(),
    }
}

#[derive(Default)]
struct Failures {
    status: bool,
    config_get: bool,
    config_post: bool,
    commands: bool,
    gallery: bool,
    logs: bool,
}

struct FakeState {
    config: Configuration,
    status: DeviceStatus,
    images: Vec<ImageEntry>,
    logs: Vec<String>,
    archive: Vec<u8>,
    posted: Vec<Configuration>,
    commands: Vec<&'static str>,
    clamp_quality: Option<i32>,
    failures: Failures,
    status_delay: Option<Duration>,
}

/// Scriptable [`DeviceApi`] implementation
pub struct FakeDevice {
    state: Mutex<FakeState>,
    status_fetches: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl FakeDevice {
    pub fn new() -> Self {
        Self::with_config(sample_config())
    }

    pub fn with_config(config: Configuration) -> Self {
        Self {
            state: Mutex::new(FakeState {
                config,
                status: DeviceStatus::default(),
                images: Vec::new(),
                logs: Vec::new(),
                archive: Vec::new(),
                posted: Vec::new(),
                commands: Vec::new(),
                clamp_quality: None,
                failures: Failures::default(),
                status_delay: None,
            }),
            status_fetches: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn set_status(&self, status: DeviceStatus) {
        self.state.lock().unwrap().status = status;
    }

    pub fn set_config(&self, config: Configuration) {
        self.state.lock().unwrap().config = config;
    }

    pub fn stored_config(&self) -> Configuration {
        self.state.lock().unwrap().config.clone()
    }

    pub fn set_images(&self, images: Vec<ImageEntry>) {
        self.state.lock().unwrap().images = images;
    }

    pub fn set_logs(&self, logs: Vec<String>) {
        self.state.lock().unwrap().logs = logs;
    }

    pub fn set_archive(&self, archive: Vec<u8>) {
        self.state.lock().unwrap().archive = archive;
    }

    /// Backend caps image_quality at this value when persisting
    pub fn clamp_quality(&self, max: i32) {
        self.state.lock().unwrap().clamp_quality = Some(max);
    }

    pub fn set_status_delay(&self, delay: Duration) {
        self.state.lock().unwrap().status_delay = Some(delay);
    }

    pub fn fail_status(&self, fail: bool) {
        self.state.lock().unwrap().failures.status = fail;
    }

    pub fn fail_config_get(&self, fail: bool) {
        self.state.lock().unwrap().failures.config_get = fail;
    }

    pub fn fail_config_post(&self, fail: bool) {
        self.state.lock().unwrap().failures.config_post = fail;
    }

    pub fn fail_commands(&self, fail: bool) {
        self.state.lock().unwrap().failures.commands = fail;
    }

    pub fn fail_gallery(&self, fail: bool) {
        self.state.lock().unwrap().failures.gallery = fail;
    }

    pub fn fail_logs(&self, fail: bool) {
        self.state.lock().unwrap().failures.logs = fail;
    }

    pub fn posted(&self) -> Vec<Configuration> {
        self.state.lock().unwrap().posted.clone()
    }

    pub fn commands(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().commands.clone()
    }

    pub fn status_fetches(&self) -> usize {
        self.status_fetches.load(Ordering::SeqCst)
    }

    pub fn max_concurrent_status_fetches(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn unavailable() -> Error {
        Error::Api {
            status: 503,
            body: "device unavailable".to_string(),
        }
    }
}

#[async_trait]
impl DeviceApi for FakeDevice {
    async fn get_config(&self) -> Result<Configuration> {
        let state = self.state.lock().unwrap();
        if state.failures.config_get {
            return Err(Self::unavailable());
        }
        Ok(state.config.clone())
    }

    async fn post_config(&self, config: &Configuration) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.posted.push(config.clone());
        if state.failures.config_post {
            return Err(Self::unavailable());
        }
        let mut stored = config.clone();
        if let Some(max) = state.clamp_quality {
            stored.image_quality = stored.image_quality.min(max);
        }
        state.config = stored;
        Ok(())
    }

    async fn start_monitoring(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.commands.push("start");
        if state.failures.commands {
            return Err(Self::unavailable());
        }
        state.status.monitoring_enabled = true;
        Ok(())
    }

    async fn stop_monitoring(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.commands.push("stop");
        if state.failures.commands {
            return Err(Self::unavailable());
        }
        state.status.monitoring_enabled = false;
        state.status.recording = false;
        Ok(())
    }

    async fn get_status(&self) -> Result<DeviceStatus> {
        self.status_fetches.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.state.lock().unwrap().status_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let result = {
            let state = self.state.lock().unwrap();
            if state.failures.status {
                Err(Self::unavailable())
            } else {
                Ok(state.status.clone())
            }
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    async fn list_images(&self) -> Result<Vec<ImageEntry>> {
        let state = self.state.lock().unwrap();
        if state.failures.gallery {
            return Err(Self::unavailable());
        }
        Ok(state.images.clone())
    }

    async fn delete_all_images(&self) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if state.failures.gallery {
            return Err(Self::unavailable());
        }
        state.images.clear();
        Ok(())
    }

    async fn download_images(&self) -> Result<Vec<u8>> {
        let state = self.state.lock().unwrap();
        if state.failures.gallery {
            return Err(Self::unavailable());
        }
        Ok(state.archive.clone())
    }

    async fn get_logs(&self) -> Result<Vec<String>> {
        let state = self.state.lock().unwrap();
        if state.failures.logs {
            return Err(Self::unavailable());
        }
        Ok(state.logs.clone())
    }

    fn resolve_url(&self, path: &str) -> String {
        format!("http://device.test{}", path)
    }
}
