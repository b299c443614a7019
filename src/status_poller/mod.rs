//! StatusPoller - Device Status Reconciliation
//!
//! ## Responsibilities
//!
//! - Fetch `/api/status` on a fixed cadence (2s by default)
//! - Derive the panel presentation from each snapshot
//! - Publish presentation changes to the PanelHub
//! - Serve out-of-cycle ticks requested by control actions
//!
//! ## Single-flight
//!
//! One task runs every tick, scheduled or requested, and awaits each
//! fetch-derive-publish cycle before waiting again, so at most one status
//! fetch is outstanding. Requests made while a tick is running collapse
//! into one follow-up tick. `tick()` also holds an in-flight lock, so
//! callers outside the loop queue behind a running tick instead of
//! overlapping it.
//!
//! Each spawned loop carries a generation number. `stop()` bumps it, so a
//! loop that was stopped exits at its next wakeup even if `start()` has
//! already spawned its replacement.

use crate::device_client::DeviceApi;
use crate::panel_hub::{PanelHub, PanelMessage};
use crate::presentation::Presentation;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default poll cadence
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// StatusPoller instance
pub struct StatusPoller {
    device: Arc<dyn DeviceApi>,
    hub: Arc<PanelHub>,
    interval: Duration,
    /// Last computed presentation
    presentation: RwLock<Presentation>,
    in_flight: Mutex<()>,
    wake: Notify,
    running: RwLock<bool>,
    generation: AtomicU64,
    tick_count: AtomicU64,
}

impl StatusPoller {
    /// Create new StatusPoller with the default cadence
    pub fn new(device: Arc<dyn DeviceApi>, hub: Arc<PanelHub>) -> Self {
        Self::with_interval(device, hub, DEFAULT_POLL_INTERVAL)
    }

    /// Create new StatusPoller with a custom cadence
    pub fn with_interval(device: Arc<dyn DeviceApi>, hub: Arc<PanelHub>, interval: Duration) -> Self {
        Self {
            device,
            hub,
            interval,
            presentation: RwLock::new(Presentation::initial()),
            in_flight: Mutex::new(()),
            wake: Notify::new(),
            running: RwLock::new(false),
            generation: AtomicU64::new(0),
            tick_count: AtomicU64::new(0),
        }
    }

    /// Start the polling loop. The first tick runs immediately.
    ///
    /// Returns `None` if the loop is already running.
    pub async fn start(self: Arc<Self>) -> Option<JoinHandle<()>> {
        let generation = {
            let mut running = self.running.write().await;
            if *running {
                tracing::warn!("Status polling already running");
                return None;
            }
            *running = true;
            self.generation.fetch_add(1, Ordering::SeqCst) + 1
        };

        tracing::info!(
            interval_ms = self.interval.as_millis() as u64,
            generation,
            "Starting status poller"
        );

        let poller = self;
        Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poller.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = poller.wake.notified() => {
                        tracing::debug!("Out-of-cycle status tick");
                    }
                }

                if !poller.is_current(generation) {
                    break;
                }

                poller.tick().await;
            }

            tracing::info!(generation, "Status poller stopped");
        }))
    }

    /// Stop the polling loop after the current tick
    pub async fn stop(&self) {
        let mut running = self.running.write().await;
        self.generation.fetch_add(1, Ordering::SeqCst);
        *running = false;
        // wake an idle loop without leaving a permit for the next one
        self.wake.notify_waiters();
        tracing::info!("Stopping status poller");
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Ask the loop for one extra tick as soon as it is idle
    pub fn request_tick(&self) {
        self.wake.notify_one();
    }

    /// One fetch-derive-publish cycle. Never fails: a failed fetch keeps
    /// the last known-good presentation and only swaps the label.
    pub async fn tick(&self) -> Presentation {
        let _in_flight = self.in_flight.lock().await;
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;

        let previous = self.presentation.read().await.clone();
        let next = match self.device.get_status().await {
            Ok(status) => {
                tracing::debug!(
                    tick,
                    recording = status.recording,
                    monitoring_enabled = status.monitoring_enabled,
                    mock_mode = status.mock_mode,
                    "Status fetched"
                );
                Presentation::derive(&status)
            }
            Err(e) => {
                tracing::warn!(tick, error = %e, "Status poll failed");
                previous.disconnected()
            }
        };

        if next != previous {
            log_transition(&previous, &next);
            *self.presentation.write().await = next.clone();
            self.hub.publish(PanelMessage::StatusUpdate(next.clone())).await;
        }

        next
    }

    /// Last computed presentation
    pub async fn presentation(&self) -> Presentation {
        self.presentation.read().await.clone()
    }

    /// Completed and running ticks since creation
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

fn log_transition(previous: &Presentation, next: &Presentation) {
    if previous.base != next.base || previous.connection != next.connection {
        tracing::info!(
            from = ?previous.base,
            to = ?next.base,
            connection = ?next.connection,
            label = %next.label,
            "Presentation state changed"
        );
    }

    match (&previous.error_banner, &next.error_banner) {
        (None, Some(err)) => tracing::warn!(camera_error = %err, "Camera reported a fault"),
        (Some(_), None) => tracing::info!("Camera fault cleared"),
        (Some(old), Some(new)) if old != new => {
            tracing::warn!(camera_error = %new, "Camera fault changed")
        }
        _ => {}
    }
}
