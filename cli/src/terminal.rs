//! Terminal implementations of the business layer's front-end seams.

use std::sync::{Mutex, PoisonError};

use verifymc_business::{Navigator, NotificationInput, NotificationKind, NotificationSystem};

use crate::output::Output;

/// Prints notifications as status lines on stderr.
pub struct TerminalNotifications {
    out: Output,
}

impl Default for TerminalNotifications {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalNotifications {
    pub fn new() -> Self {
        Self {
            out: Output::stderr(),
        }
    }
}

/// One-line rendering: `title: message`, or just the title.
pub fn notification_line(notification: &NotificationInput) -> String {
    match notification.message.as_deref() {
        Some(message) if !message.is_empty() => format!("{}: {message}", notification.title),
        _ => notification.title.clone(),
    }
}

impl NotificationSystem for TerminalNotifications {
    fn add_notification(&self, notification: NotificationInput) {
        let line = notification_line(&notification);
        match notification.kind {
            NotificationKind::Success => self.out.success(line),
            NotificationKind::Error => self.out.error(line),
            NotificationKind::Warning => self.out.warning(line),
            NotificationKind::Info => self.out.info(line),
        }
    }
}

/// A terminal has no pages; a redirect to login becomes a hint to sign in
/// again.
#[derive(Debug)]
pub struct TerminalNavigator {
    location: Mutex<String>,
}

impl TerminalNavigator {
    /// `location` names the command being run, e.g. `/admin/users`.
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(location.into()),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn assign(&self, destination: &str) {
        tracing::debug!(destination, "redirect requested");
        if destination.starts_with(verifymc_business::session::LOGIN_PATH) {
            Output::stderr().warning("Session expired or missing. Run `verifymc login` first.");
        }
        *self.location.lock().unwrap_or_else(PoisonError::into_inner) = destination.to_owned();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notification_line() {
        let with_message =
            NotificationInput::new(NotificationKind::Error, "Error").with_message("Network error");
        assert_eq!(notification_line(&with_message), "Error: Network error");

        let bare = NotificationInput::new(NotificationKind::Success, "Success");
        assert_eq!(notification_line(&bare), "Success");
    }

    #[test]
    fn test_navigator_tracks_location() {
        let navigator = TerminalNavigator::new("/admin/users");
        assert_eq!(navigator.current_location(), "/admin/users");
        navigator.assign("/login?redirect=%2Fadmin%2Fusers");
        assert_eq!(
            navigator.current_location(),
            "/login?redirect=%2Fadmin%2Fusers"
        );
    }
}
