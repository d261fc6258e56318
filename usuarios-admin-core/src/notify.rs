//! User-facing notifications (toasts)

use std::time::Duration;

/// Notification severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

/// A transient message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub summary: String,
    pub detail: String,
    /// How long the toast stays on screen.
    pub life: Duration,
}

impl Notification {
    pub fn success(detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            summary: "Éxito".to_string(),
            detail: detail.into(),
            life: Duration::from_millis(3000),
        }
    }

    pub fn error(detail: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            summary: "Error".to_string(),
            detail: detail.into(),
            life: Duration::from_millis(5000),
        }
    }
}

/// Where notifications are delivered. The frontend supplies its toast
/// implementation.
pub trait Notifier: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log. Used when no frontend is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => log::info!("{}: {}", notification.summary, notification.detail),
            Severity::Error => log::warn!("{}: {}", notification.summary, notification.detail),
        }
    }
}
