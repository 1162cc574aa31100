//! Message translation seam.

use std::collections::HashMap;

/// Resolves a message key to display text.
pub trait Translate: Send + Sync {
    fn t(&self, key: &str) -> String;
}

/// Returns keys unchanged. Handy in tests, where keys are easier to assert on.
#[derive(Debug, Default, Clone, Copy)]
pub struct KeyTranslator;

impl Translate for KeyTranslator {
    fn t(&self, key: &str) -> String {
        key.to_owned()
    }
}

/// Fixed key/text table. Missing keys fall back to the key itself.
#[derive(Debug, Default, Clone)]
pub struct Catalog {
    entries: HashMap<String, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, text: impl Into<String>) {
        self.entries.insert(key.into(), text.into());
    }

    pub fn with(mut self, key: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(key, text);
        self
    }

    /// English strings for the messages this crate emits.
    pub fn english() -> Self {
        Self::new()
            .with("common.error", "Error")
            .with("common.success", "Success")
            .with("errors.network", "Network error, please try again later")
            .with("admin.users.messages.load_error", "Failed to load users")
            .with("admin.review.messages.approve_success", "User approved")
            .with("admin.review.messages.reject_success", "User rejected")
            .with("admin.users.messages.ban_success", "User banned")
            .with("admin.users.messages.unban_success", "User unbanned")
            .with("admin.users.messages.delete_success", "User deleted")
            .with("admin.users.messages.password_success", "Password changed")
            .with("admin.users.messages.action_error", "Operation failed")
            .with("dashboard.menu.profile", "Profile")
            .with("dashboard.menu.downloads", "Downloads")
            .with("dashboard.menu.server_status", "Server Status")
            .with("dashboard.menu.user_management", "User Management")
            .with("dashboard.menu.audit_log", "Audit Log")
    }
}

impl FromIterator<(String, String)> for Catalog {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

impl Translate for Catalog {
    fn t(&self, key: &str) -> String {
        self.entries
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_falls_back_to_key() {
        let catalog = Catalog::new().with("common.error", "Error");
        assert_eq!(catalog.t("common.error"), "Error");
        assert_eq!(catalog.t("missing.key"), "missing.key");
        assert_eq!(KeyTranslator.t("errors.network"), "errors.network");
    }

    #[test]
    fn test_english_has_loader_messages() {
        let catalog = Catalog::english();
        assert_eq!(catalog.t("errors.network"), "Network error, please try again later");
        assert_eq!(catalog.t("admin.users.messages.load_error"), "Failed to load users");
    }
}
