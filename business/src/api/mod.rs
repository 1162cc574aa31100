//! Typed client for the portal REST API.
//!
//! All calls go through one request path that attaches the session's bearer
//! token, applies the configured timeout and escalates authentication failures:
//! a 401/403 status, or a `success: false` body whose message contains
//! `Authentication required`, clears the session and redirects to login before
//! [`ApiError::AuthenticationRequired`] reaches the caller.
//!
//! Endpoint methods live in [`admin`] and [`public`].

pub mod admin;
pub mod models;
pub mod public;

use std::sync::Arc;

use log::{debug, warn};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::config::BusinessConfig;
use crate::http::{Client, HttpError, RequestBuilder};
use crate::session::{SessionStore, StorageError};

pub use models::*;

pub const AUTHENTICATION_REQUIRED: &str = "Authentication required";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("Authentication required")]
    AuthenticationRequired,
    #[error("API returned status: {0}")]
    Status(u16),
    #[error("failed to decode response: {0}")]
    Decode(String),
    #[error("failed to encode request: {0}")]
    Encode(String),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    /// No response was obtained at all.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Http(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(err) if err.is_timeout())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Clone)]
pub struct ApiClient {
    config: BusinessConfig,
    session: Arc<SessionStore>,
}

impl ApiClient {
    pub fn new(config: BusinessConfig, session: Arc<SessionStore>) -> Self {
        Self { config, session }
    }

    pub fn config(&self) -> &BusinessConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Default language for calls that produce localized messages.
    pub fn locale(&self) -> &str {
        &self.config.locale
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{endpoint}", self.config.api_url())
    }

    fn prepare(&self, builder: RequestBuilder) -> RequestBuilder {
        let builder = builder
            .header("content-type", "application/json")
            .timeout(self.config.request_timeout);
        match self.session.token() {
            Some(token) => builder.bearer_auth(&token),
            None => builder,
        }
    }

    pub(crate) async fn get<T: DeserializeOwned>(&self, endpoint: &str) -> ApiResult<T> {
        let request = self.prepare(Client::get(self.url(endpoint)));
        self.execute(request).await
    }

    pub(crate) async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> ApiResult<T> {
        let request = self
            .prepare(Client::post(self.url(endpoint)))
            .json(body)
            .map_err(|e| ApiError::Encode(e.to_string()))?;
        self.execute(request).await
    }

    async fn execute<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let url = request.url().to_owned();
        debug!("ApiClient: requesting {url}");

        let response = request.send().await.map_err(|err| {
            warn!("ApiClient: {url} failed: {err}");
            ApiError::from(err)
        })?;

        if matches!(response.status, 401 | 403) {
            warn!(
                "ApiClient: {url} returned {}, invalidating session",
                response.status
            );
            self.session.handle_unauthorized(None);
            return Err(ApiError::AuthenticationRequired);
        }

        let body: Value = match response.json() {
            Ok(body) => body,
            Err(_) if !response.is_success() => return Err(ApiError::Status(response.status)),
            Err(err) => return Err(ApiError::Decode(err.to_string())),
        };

        if requires_authentication(&body) {
            warn!("ApiClient: {url} reported an authentication failure, invalidating session");
            self.session.handle_unauthorized(None);
            return Err(ApiError::AuthenticationRequired);
        }

        serde_json::from_value(body).map_err(|e| ApiError::Decode(format!("{url}: {e}")))
    }
}

fn requires_authentication(body: &Value) -> bool {
    body.get("success").and_then(Value::as_bool) == Some(false)
        && body_message(body).is_some_and(|message| message.contains(AUTHENTICATION_REQUIRED))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_authentication() {
        assert!(requires_authentication(
            &serde_json::json!({"success": false, "msg": "Authentication required"})
        ));
        assert!(requires_authentication(
            &serde_json::json!({"success": false, "message": "Authentication required: token expired"})
        ));
        assert!(!requires_authentication(
            &serde_json::json!({"success": true, "message": "Authentication required"})
        ));
        assert!(!requires_authentication(
            &serde_json::json!({"success": false, "message": "User not found"})
        ));
    }

    #[test]
    fn test_error_classification() {
        let timeout = ApiError::from(HttpError::Timeout(std::time::Duration::from_secs(1)));
        assert!(timeout.is_network());
        assert!(timeout.is_timeout());
        assert!(!ApiError::AuthenticationRequired.is_network());
        assert_eq!(
            ApiError::AuthenticationRequired.to_string(),
            AUTHENTICATION_REQUIRED
        );
    }
}
