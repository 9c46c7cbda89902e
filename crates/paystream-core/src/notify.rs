//! The notification channel: where user-facing outcome messages go.

use std::fmt;
use std::sync::Mutex;

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Receiver of user-facing messages (a toast area, a terminal, a log).
pub trait Notifier: Send + Sync + 'static {
    fn notify(&self, message: &str, kind: NotificationKind);
}

/// Forwards notifications to `tracing`. Used when there is no UI.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        match kind {
            NotificationKind::Success => tracing::info!(target: "paystream::notify", %message),
            NotificationKind::Error => tracing::warn!(target: "paystream::notify", %message),
        }
    }
}

/// Keeps every notification in memory.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    entries: Mutex<Vec<(String, NotificationKind)>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// All notifications so far, oldest first.
    pub fn entries(&self) -> Vec<(String, NotificationKind)> {
        self.entries
            .lock()
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    pub fn last(&self) -> Option<(String, NotificationKind)> {
        self.entries().pop()
    }

    pub fn count(&self, kind: NotificationKind) -> usize {
        self.entries().iter().filter(|(_, k)| *k == kind).count()
    }

    pub fn clear(&self) {
        if let Ok(mut e) = self.entries.lock() {
            e.clear();
        }
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        if let Ok(mut e) = self.entries.lock() {
            e.push((message.to_string(), kind));
        }
    }
}
