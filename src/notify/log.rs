use super::{Notification, Notifier};

/// Notifier that writes to the tracing log. Used when there is no UI to toast on.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        tracing::warn!(
            level = ?notification.level,
            timestamp = %notification.timestamp,
            "{}",
            notification.message
        );
    }
}
