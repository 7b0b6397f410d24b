//! User-visible transient notifications (toasts)
//!
//! This module provides:
//! - `Notifier`: the fire-and-forget error surface the feed reports through
//! - `NotificationBus`: broadcast channel so a UI can subscribe to notifications
//! - `LogNotifier`: writes notifications to the tracing log (CLI default)
//! - `RecordingNotifier`: keeps every message in memory (tests)

mod bus;
mod log;
mod recording;

pub use bus::NotificationBus;
pub use log::LogNotifier;
pub use recording::RecordingNotifier;

use serde::{Deserialize, Serialize};

/// Severity of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationLevel {
    Error,
}

/// A transient message for the viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl Notification {
    /// Create an error notification with the current timestamp
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NotificationLevel::Error,
            message: message.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Fire-and-forget notification sink.
///
/// Emitting never blocks and never fails from the caller's point of view.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);

    /// Surface a transient error message
    fn error(&self, message: &str) {
        self.notify(Notification::error(message));
    }
}
