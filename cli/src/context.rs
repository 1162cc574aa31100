//! Wiring of the business layer for one CLI invocation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use verifymc_business::{
    AdminUserActions, AdminUsers, AdminUsersState, ApiClient, Catalog, Notifications,
    SessionStore, Translate,
};

use crate::config::{Config, FileStorage};
use crate::terminal::{TerminalNavigator, TerminalNotifications};

/// Overrides taken from the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub api_url: Option<String>,
    pub locale: Option<String>,
}

pub struct AppContext {
    pub api: ApiClient,
    pub session: Arc<SessionStore>,
    pub notifications: Notifications,
    pub translator: Arc<dyn Translate>,
    storage: Arc<FileStorage>,
}

impl AppContext {
    /// Context over the user's config file. `location` names the admin page
    /// the command stands in for.
    pub fn open(overrides: &Overrides, location: &str) -> Result<Self> {
        Self::with_config_path(Config::config_path()?, overrides, location)
    }

    pub fn with_config_path(path: PathBuf, overrides: &Overrides, location: &str) -> Result<Self> {
        let storage = Arc::new(FileStorage::open(path)?);
        let business = storage
            .config()
            .business_config(overrides.api_url.as_deref(), overrides.locale.as_deref());
        tracing::debug!(api_url = %business.api_url(), "using portal");

        let session = Arc::new(SessionStore::new(
            storage.clone(),
            Arc::new(TerminalNavigator::new(location)),
        ));
        let api = ApiClient::new(business, session.clone());
        let notifications = Notifications::with_system(Arc::new(TerminalNotifications::new()));

        Ok(Self {
            api,
            session,
            notifications,
            translator: Arc::new(Catalog::english()),
            storage,
        })
    }

    pub fn config_path(&self) -> &std::path::Path {
        self.storage.path()
    }

    pub fn locale(&self) -> &str {
        self.api.locale()
    }

    /// Fail early when there is no usable admin session.
    pub fn require_session(&self) -> Result<()> {
        if !self.session.is_authenticated() {
            bail!("Not signed in. Run `verifymc login` first.");
        }
        Ok(())
    }

    pub fn admin_users(&self, state: AdminUsersState) -> AdminUsers<ApiClient> {
        AdminUsers::with_state(
            Arc::new(self.api.clone()),
            self.notifications.clone(),
            self.translator.clone(),
            state,
        )
    }

    pub fn actions(&self) -> AdminUserActions {
        AdminUserActions::new(
            self.api.clone(),
            self.notifications.clone(),
            self.translator.clone(),
        )
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::CliTestContext;

    #[tokio::test]
    async fn test_require_session() {
        let ctx = CliTestContext::new("/admin").await;
        assert!(ctx.app.require_session().is_err());

        ctx.set_authenticated("abc");
        assert!(ctx.app.require_session().is_ok());
        assert_eq!(ctx.app.locale(), "en");
    }

    #[tokio::test]
    async fn test_session_is_written_to_config_file() {
        let ctx = CliTestContext::new("/admin").await;
        ctx.set_authenticated("abc");

        let content = std::fs::read_to_string(ctx.app.config_path()).expect("Should read file");
        assert!(content.contains("[session]"));
        assert!(content.contains("admin_token = \"abc\""));
    }
}
