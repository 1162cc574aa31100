//! Admin endpoints under `/api/admin/*`.

use log::info;

use super::models::{
    Ack, AdminLoginRequest, AdminLoginResponse, AuditResponse, ChangePasswordRequest,
    LanguageRequest, ReviewAction, ReviewRequest, TokenRequest, UsernameRequest, UsersResponse,
};
use super::{ApiClient, ApiError, ApiResult};

impl ApiClient {
    /// POST `/admin/login`
    ///
    /// On success the token is stored with the configured session lifetime and
    /// the admin flag is set.
    pub async fn admin_login(&self, password: &str, language: &str) -> ApiResult<AdminLoginResponse> {
        let response: AdminLoginResponse = self
            .post("/admin/login", &AdminLoginRequest { password, language })
            .await?;

        if response.success
            && let Some(token) = response.token.as_deref()
        {
            self.session
                .start_session(token, self.config.session_ttl)?;
            self.session.set_admin_status(true)?;
            info!("ApiClient: admin session started");
        }
        Ok(response)
    }

    /// POST `/admin/verify`: check that the stored token is still accepted.
    pub async fn verify_admin_token(&self, language: &str) -> ApiResult<Ack> {
        let token = self.session.token().ok_or(ApiError::AuthenticationRequired)?;
        self.post("/admin/verify", &TokenRequest { token: &token, language })
            .await
    }

    /// GET `/admin/users?language=..&status=pending`
    pub async fn pending_list(&self, language: &str) -> ApiResult<UsersResponse> {
        self.get(&format!(
            "/admin/users?language={}&status=pending",
            urlencoding::encode(language)
        ))
        .await
    }

    /// GET `/admin/users`
    pub async fn all_users(&self) -> ApiResult<UsersResponse> {
        self.get("/admin/users").await
    }

    /// GET `/admin/users?page=..&size=..[&search=..]`
    ///
    /// A blank search is left out of the query.
    pub async fn users_paginated(
        &self,
        page: u32,
        page_size: u32,
        search: &str,
    ) -> ApiResult<UsersResponse> {
        let mut endpoint = format!("/admin/users?page={page}&size={page_size}");
        let search = search.trim();
        if !search.is_empty() {
            endpoint.push_str("&search=");
            endpoint.push_str(&urlencoding::encode(search));
        }
        self.get(&endpoint).await
    }

    /// POST `/admin/user/approve` or `/admin/user/reject`
    pub async fn review_user(
        &self,
        username: &str,
        action: ReviewAction,
        reason: Option<&str>,
        language: &str,
    ) -> ApiResult<Ack> {
        let endpoint = match action {
            ReviewAction::Approve => "/admin/user/approve",
            ReviewAction::Reject => "/admin/user/reject",
        };
        self.post(
            endpoint,
            &ReviewRequest {
                username,
                action,
                reason,
                language,
            },
        )
        .await
    }

    /// POST `/admin/user/delete`
    pub async fn delete_user(&self, username: &str, language: &str) -> ApiResult<Ack> {
        self.post("/admin/user/delete", &UsernameRequest { username, language })
            .await
    }

    /// POST `/admin/user/ban`
    pub async fn ban_user(&self, username: &str, language: &str) -> ApiResult<Ack> {
        self.post("/admin/user/ban", &UsernameRequest { username, language })
            .await
    }

    /// POST `/admin/user/unban`
    pub async fn unban_user(&self, username: &str, language: &str) -> ApiResult<Ack> {
        self.post("/admin/user/unban", &UsernameRequest { username, language })
            .await
    }

    /// POST `/admin/user/password`
    pub async fn change_password(
        &self,
        username: &str,
        password: &str,
        language: &str,
    ) -> ApiResult<Ack> {
        self.post(
            "/admin/user/password",
            &ChangePasswordRequest {
                username,
                password,
                language,
            },
        )
        .await
    }

    /// POST `/admin/sync`: ask the server to sync with its external account
    /// directory (AuthMe).
    pub async fn sync_directory(&self, language: &str) -> ApiResult<Ack> {
        self.post("/admin/sync", &LanguageRequest { language }).await
    }

    /// GET `/admin/audits`
    pub async fn audit_log(&self) -> ApiResult<AuditResponse> {
        self.get("/admin/audits").await
    }

    /// Drop the local session. The server keeps no logout state.
    pub fn logout(&self) {
        self.session.clear_token();
        info!("ApiClient: logged out");
    }
}
