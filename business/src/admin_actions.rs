//! Review and moderation actions on a single account.
//!
//! Every action is a server round trip. The local list is never patched; after
//! a successful action the caller reloads it.

use std::sync::Arc;

use log::{info, warn};

use crate::admin_users::{AdminUsers, AdminUsersSource, ERROR_TITLE_KEY, NETWORK_ERROR_KEY};
use crate::api::{Ack, ApiClient, ApiError, ApiResult, ReviewAction};
use crate::i18n::Translate;
use crate::notification::Notifications;

pub const SUCCESS_TITLE_KEY: &str = "common.success";
pub const ACTION_ERROR_KEY: &str = "admin.users.messages.action_error";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminUserAction {
    Approve,
    Reject { reason: Option<String> },
    Ban,
    Unban,
    Delete,
    ChangePassword { password: String },
}

impl AdminUserAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject { .. } => "reject",
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::Delete => "delete",
            Self::ChangePassword { .. } => "password",
        }
    }

    /// Message key shown after the action succeeds.
    pub fn success_key(&self) -> &'static str {
        match self {
            Self::Approve => "admin.review.messages.approve_success",
            Self::Reject { .. } => "admin.review.messages.reject_success",
            Self::Ban => "admin.users.messages.ban_success",
            Self::Unban => "admin.users.messages.unban_success",
            Self::Delete => "admin.users.messages.delete_success",
            Self::ChangePassword { .. } => "admin.users.messages.password_success",
        }
    }
}

#[derive(Clone)]
pub struct AdminUserActions {
    api: ApiClient,
    notifications: Notifications,
    translator: Arc<dyn Translate>,
    locale: String,
}

impl AdminUserActions {
    pub fn new(api: ApiClient, notifications: Notifications, translator: Arc<dyn Translate>) -> Self {
        let locale = api.locale().to_owned();
        Self {
            api,
            notifications,
            translator,
            locale,
        }
    }

    pub fn with_locale(mut self, locale: impl Into<String>) -> Self {
        self.locale = locale.into();
        self
    }

    /// Send the action to the server without notifying anyone.
    pub async fn execute(&self, username: &str, action: &AdminUserAction) -> ApiResult<Ack> {
        let language = self.locale.as_str();
        match action {
            AdminUserAction::Approve => {
                self.api
                    .review_user(username, ReviewAction::Approve, None, language)
                    .await
            }
            AdminUserAction::Reject { reason } => {
                self.api
                    .review_user(username, ReviewAction::Reject, reason.as_deref(), language)
                    .await
            }
            AdminUserAction::Ban => self.api.ban_user(username, language).await,
            AdminUserAction::Unban => self.api.unban_user(username, language).await,
            AdminUserAction::Delete => self.api.delete_user(username, language).await,
            AdminUserAction::ChangePassword { password } => {
                self.api.change_password(username, password, language).await
            }
        }
    }

    /// Run the action and report the outcome. Returns whether it succeeded.
    pub async fn perform(&self, username: &str, action: &AdminUserAction) -> bool {
        match self.execute(username, action).await {
            Ok(ack) if ack.success => {
                info!("AdminUserActions: {} {username} succeeded", action.name());
                let message = ack
                    .message()
                    .map(str::to_owned)
                    .unwrap_or_else(|| self.translator.t(action.success_key()));
                self.notifications
                    .success(self.translator.t(SUCCESS_TITLE_KEY), Some(message));
                true
            }
            Ok(ack) => {
                warn!(
                    "AdminUserActions: {} {username} rejected: {:?}",
                    action.name(),
                    ack.message()
                );
                let message = ack
                    .message()
                    .map(str::to_owned)
                    .unwrap_or_else(|| self.translator.t(ACTION_ERROR_KEY));
                self.notify_error(message);
                false
            }
            Err(err) => {
                warn!("AdminUserActions: {} {username} failed: {err}", action.name());
                let message = match err {
                    ApiError::AuthenticationRequired => err.to_string(),
                    err if err.is_network() => self.translator.t(NETWORK_ERROR_KEY),
                    _ => self.translator.t(ACTION_ERROR_KEY),
                };
                self.notify_error(message);
                false
            }
        }
    }

    /// Run the action and reload `users` when it succeeds.
    pub async fn perform_and_reload<S>(
        &self,
        users: &AdminUsers<S>,
        username: &str,
        action: &AdminUserAction,
    ) -> bool
    where
        S: AdminUsersSource + 'static,
    {
        let succeeded = self.perform(username, action).await;
        if succeeded {
            users.load_all_users().await;
        }
        succeeded
    }

    fn notify_error(&self, message: String) {
        self.notifications
            .error(self.translator.t(ERROR_TITLE_KEY), Some(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_names_and_keys() {
        assert_eq!(AdminUserAction::Reject { reason: None }.name(), "reject");
        assert_eq!(
            AdminUserAction::ChangePassword {
                password: "x".to_owned()
            }
            .success_key(),
            "admin.users.messages.password_success"
        );
    }
}
