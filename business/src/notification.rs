//! User-facing notifications.
//!
//! [`Notifications`] is a cloneable handle created once at start-up and passed
//! to every component that reports to the user. A front end wires a
//! [`NotificationSystem`] into it; until then notifications are logged and
//! dropped.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use log::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Success,
    Error,
    Warning,
    Info,
}

impl NotificationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationInput {
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    /// How long the front end should keep it on screen. `None` uses its default.
    pub duration: Option<Duration>,
}

impl NotificationInput {
    pub fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: None,
            duration: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Something that can display notifications.
pub trait NotificationSystem: Send + Sync {
    fn add_notification(&self, notification: NotificationInput);
}

/// Context handle for the notification sink.
///
/// Clones share the same wiring.
#[derive(Clone, Default)]
pub struct Notifications {
    system: Arc<RwLock<Option<Arc<dyn NotificationSystem>>>>,
}

impl fmt::Debug for Notifications {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifications")
            .field("wired", &self.is_wired())
            .finish()
    }
}

impl Notifications {
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle already wired to `system`.
    pub fn with_system(system: Arc<dyn NotificationSystem>) -> Self {
        let notifications = Self::new();
        notifications.set_system(Some(system));
        notifications
    }

    pub fn set_system(&self, system: Option<Arc<dyn NotificationSystem>>) {
        *self.system.write().unwrap_or_else(PoisonError::into_inner) = system;
    }

    pub fn clear_system(&self) {
        self.set_system(None);
    }

    pub fn is_wired(&self) -> bool {
        self.system
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    pub fn show(&self, notification: NotificationInput) {
        let system = self
            .system
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        match system {
            Some(system) => system.add_notification(notification),
            None => warn!(
                "Notifications: no notification system wired, dropping {} notification {:?}",
                notification.kind, notification.title
            ),
        }
    }

    fn notify(
        &self,
        kind: NotificationKind,
        title: impl Into<String>,
        message: Option<String>,
        duration: Option<Duration>,
    ) {
        self.show(NotificationInput {
            kind,
            title: title.into(),
            message,
            duration,
        });
    }

    pub fn success(&self, title: impl Into<String>, message: Option<String>) {
        self.notify(NotificationKind::Success, title, message, None);
    }

    pub fn error(&self, title: impl Into<String>, message: Option<String>) {
        self.notify(NotificationKind::Error, title, message, None);
    }

    pub fn warning(&self, title: impl Into<String>, message: Option<String>) {
        self.notify(NotificationKind::Warning, title, message, None);
    }

    pub fn info(&self, title: impl Into<String>, message: Option<String>) {
        self.notify(NotificationKind::Info, title, message, None);
    }
}

/// Forwards notifications into a channel drained by a front end.
#[derive(Debug, Clone)]
pub struct ChannelNotificationSystem {
    sender: flume::Sender<NotificationInput>,
}

impl ChannelNotificationSystem {
    pub fn new() -> (Self, flume::Receiver<NotificationInput>) {
        let (sender, receiver) = flume::unbounded();
        (Self { sender }, receiver)
    }
}

impl NotificationSystem for ChannelNotificationSystem {
    fn add_notification(&self, notification: NotificationInput) {
        if self.sender.send(notification).is_err() {
            warn!("ChannelNotificationSystem: receiver dropped");
        }
    }
}
