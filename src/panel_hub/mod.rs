//! PanelHub - Panel Update Distribution
//!
//! ## Responsibilities
//!
//! - Subscriber management for panel views (console, tests, future UIs)
//! - Fan-out of presentation changes, operator notifications,
//!   config reloads and gallery refreshes
//!
//! Messages are serde-tagged so a view can forward them as JSON unchanged.

use crate::presentation::Presentation;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Hub message types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
#[serde(rename_all = "snake_case")]
pub enum PanelMessage {
    /// Presentation changed since the last published one
    StatusUpdate(Presentation),
    /// Operator-facing notice
    Notification(NotificationMessage),
    /// Configuration (re)loaded and zone grid re-rendered
    ConfigLoaded(ConfigLoadedMessage),
    /// Gallery listing refreshed
    GalleryUpdated(GalleryUpdatedMessage),
    /// Backend log lines, newest first
    Logs(LogsMessage),
}

/// How a notification must be presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    /// Informational confirmation
    Info,
    /// Must be acknowledged by the operator
    Blocking,
}

/// Operator notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub level: NotificationLevel,
    pub message: String,
    pub timestamp: String,
}

/// Config reload summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigLoadedMessage {
    pub grid_rows: u32,
    pub grid_cols: u32,
    pub active_cells: usize,
    pub timestamp: String,
}

/// Gallery refresh summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryUpdatedMessage {
    pub image_count: usize,
    /// Most recent capture, if any
    pub latest: Option<String>,
    pub timestamp: String,
}

/// Log viewer content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsMessage {
    pub lines: Vec<String>,
    /// Set when the fetch failed; `lines` is then empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PanelMessage {
    /// Blocking notification stamped now
    pub fn blocking(message: impl Into<String>) -> Self {
        PanelMessage::Notification(NotificationMessage {
            level: NotificationLevel::Blocking,
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    /// Informational notification stamped now
    pub fn info(message: impl Into<String>) -> Self {
        PanelMessage::Notification(NotificationMessage {
            level: NotificationLevel::Info,
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        })
    }

    fn kind(&self) -> &'static str {
        match self {
            PanelMessage::StatusUpdate(_) => "status_update",
            PanelMessage::Notification(_) => "notification",
            PanelMessage::ConfigLoaded(_) => "config_loaded",
            PanelMessage::GalleryUpdated(_) => "gallery_updated",
            PanelMessage::Logs(_) => "logs",
        }
    }
}

/// PanelHub instance
pub struct PanelHub {
    subscribers: RwLock<HashMap<Uuid, mpsc::UnboundedSender<PanelMessage>>>,
    subscriber_count: AtomicU64,
}

impl PanelHub {
    /// Create new PanelHub
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            subscriber_count: AtomicU64::new(0),
        }
    }

    /// Register a new view
    pub async fn subscribe(&self) -> (Uuid, mpsc::UnboundedReceiver<PanelMessage>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();

        self.subscribers.write().await.insert(id, tx);
        self.subscriber_count.fetch_add(1, Ordering::Relaxed);

        tracing::debug!(subscriber_id = %id, "Panel view subscribed");

        (id, rx)
    }

    /// Unregister a view
    pub async fn unsubscribe(&self, id: &Uuid) {
        if self.subscribers.write().await.remove(id).is_some() {
            self.subscriber_count.fetch_sub(1, Ordering::Relaxed);
            tracing::debug!(subscriber_id = %id, "Panel view unsubscribed");
        }
    }

    /// Send message to all views; views whose receiver is gone are dropped
    pub async fn publish(&self, message: PanelMessage) {
        tracing::debug!(message_type = %message.kind(), "Publishing panel message");

        let mut closed = Vec::new();
        {
            let subscribers = self.subscribers.read().await;
            for (id, tx) in subscribers.iter() {
                if tx.send(message.clone()).is_err() {
                    closed.push(*id);
                }
            }
        }

        for id in closed {
            self.unsubscribe(&id).await;
        }
    }

    /// Get subscriber count
    pub fn subscriber_count(&self) -> u64 {
        self.subscriber_count.load(Ordering::Relaxed)
    }
}

impl Default for PanelHub {
    fn default() -> Self {
        Self::new()
    }
}
