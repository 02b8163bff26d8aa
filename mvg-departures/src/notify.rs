//! User-visible notifications.
//!
//! The core reports outcomes (a pin was set, a request failed) through a
//! [`Notifier`]. Delivery is fire-and-forget.

use std::sync::{Arc, Mutex};

use serde::Serialize;
use tracing::{info, warn};

/// Whether a notification reports success or failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Severity {
    Success,
    Failure,
}

/// A toast-style message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn success(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn failure(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Failure,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, notification: Notification);
}

/// Writes notifications to the log.
#[derive(Debug, Clone, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn notify(&self, notification: Notification) {
        match notification.severity {
            Severity::Success => {
                info!(title = %notification.title, "{}", notification.message)
            }
            Severity::Failure => {
                warn!(title = %notification.title, "{}", notification.message)
            }
        }
    }
}

/// Keeps every notification in memory, optionally forwarding to another
/// notifier.
///
/// The HTTP surface uses this to let clients poll recent notifications.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    seen: Arc<Mutex<Vec<Notification>>>,
    forward: Option<Arc<dyn Notifier>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record and also pass every notification on to `next`.
    pub fn forwarding_to(next: impl Notifier) -> Self {
        Self {
            seen: Arc::default(),
            forward: Some(Arc::new(next)),
        }
    }

    /// All notifications so far, oldest first.
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Remove and return all notifications so far.
    pub fn drain(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }

    pub fn failures(&self) -> Vec<Notification> {
        self.all()
            .into_iter()
            .filter(|n| n.severity == Severity::Failure)
            .collect()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        if let Some(next) = &self.forward {
            next.notify(notification.clone());
        }
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(notification);
        }
    }
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notification: Notification) {
        (**self).notify(notification)
    }
}
