//! Endpoints used by the registration flow and the player dashboard.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::ApiClient;
use super::ApiResult;
use super::models::{
    Ack, CaptchaResponse, DiscordAuthResponse, DiscordStatusResponse, DownloadsResponse,
    PortalConfig, QuestionnaireAnswer, QuestionnaireConfigResponse, RegisterRequest,
    SendCodeRequest, ServerStatusResponse, SubmitQuestionnaireRequest,
    SubmitQuestionnaireResponse, UserStatusResponse, UsernameRequest, VersionResponse,
};

/// `/config` wraps the configuration in `{success, config}`; some servers
/// return it bare.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigEnvelope {
    Wrapped { config: PortalConfig },
    Bare(PortalConfig),
}

impl ApiClient {
    /// GET `/config`
    pub async fn portal_config(&self) -> ApiResult<PortalConfig> {
        let envelope: ConfigEnvelope = self.get("/config").await?;
        Ok(match envelope {
            ConfigEnvelope::Wrapped { config } | ConfigEnvelope::Bare(config) => config,
        })
    }

    /// GET `/captcha`
    pub async fn captcha(&self) -> ApiResult<CaptchaResponse> {
        self.get("/captcha").await
    }

    /// POST `/verify/send`: email a verification code.
    pub async fn send_code(&self, email: &str, language: &str) -> ApiResult<Ack> {
        self.post("/verify/send", &SendCodeRequest { email, language })
            .await
    }

    /// POST `/register`
    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<Ack> {
        self.post("/register", request).await
    }

    /// GET `/questionnaire/config?language=..`
    pub async fn questionnaire(&self, language: &str) -> ApiResult<QuestionnaireConfigResponse> {
        self.get(&format!(
            "/questionnaire/config?language={}",
            urlencoding::encode(language)
        ))
        .await
    }

    /// POST `/questionnaire/submit`
    pub async fn submit_questionnaire(
        &self,
        answers: &BTreeMap<String, QuestionnaireAnswer>,
        language: &str,
    ) -> ApiResult<SubmitQuestionnaireResponse> {
        self.post(
            "/questionnaire/submit",
            &SubmitQuestionnaireRequest { answers, language },
        )
        .await
    }

    /// GET `/user/status`
    pub async fn user_status(&self) -> ApiResult<UserStatusResponse> {
        self.get("/user/status").await
    }

    /// GET `/version`
    pub async fn version(&self) -> ApiResult<VersionResponse> {
        self.get("/version").await
    }

    /// GET `/discord/auth?username=..`
    pub async fn discord_auth_url(&self, username: &str) -> ApiResult<DiscordAuthResponse> {
        self.get(&format!(
            "/discord/auth?username={}",
            urlencoding::encode(username)
        ))
        .await
    }

    /// GET `/discord/status?username=..`
    pub async fn discord_status(&self, username: &str) -> ApiResult<DiscordStatusResponse> {
        self.get(&format!(
            "/discord/status?username={}",
            urlencoding::encode(username)
        ))
        .await
    }

    /// POST `/discord/unlink`
    pub async fn discord_unlink(&self, username: &str, language: &str) -> ApiResult<Ack> {
        self.post("/discord/unlink", &UsernameRequest { username, language })
            .await
    }

    /// GET `/server/status`
    pub async fn server_status(&self) -> ApiResult<ServerStatusResponse> {
        self.get("/server/status").await
    }

    /// GET `/downloads`
    pub async fn downloads(&self) -> ApiResult<DownloadsResponse> {
        self.get("/downloads").await
    }
}
