//! Wire types for the portal REST API.
//!
//! The server is not consistent about field casing (`regTime` next to
//! `questionnaire_score`) or about where it puts a human-readable message
//! (`msg` or `message`), so most fields are optional and accept both spellings.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Review status of a registered account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
    Banned,
    /// A status this client does not know about, kept as sent.
    Other(String),
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Other(String::new())
    }
}

impl UserStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
            Self::Banned => "banned",
            Self::Other(other) => other,
        }
    }
}

impl From<String> for UserStatus {
    fn from(value: String) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "pending" => Self::Pending,
            "approved" => Self::Approved,
            "rejected" => Self::Rejected,
            "banned" => Self::Banned,
            _ => Self::Other(value),
        }
    }
}

impl From<UserStatus> for String {
    fn from(value: UserStatus) -> Self {
        value.as_str().to_owned()
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Registration time: epoch milliseconds from the plugin, a preformatted
/// string from older servers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RegistrationTime {
    Millis(i64),
    Text(String),
}

impl RegistrationTime {
    /// Render as `YYYY-MM-DD HH:MM` (UTC) when the value is a timestamp.
    pub fn display(&self) -> String {
        match self {
            Self::Millis(millis) => chrono::DateTime::from_timestamp_millis(*millis)
                .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
                .unwrap_or_else(|| millis.to_string()),
            Self::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub username: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: UserStatus,
    #[serde(
        default,
        rename = "regTime",
        alias = "reg_time",
        alias = "registrationTime",
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_time: Option<RegistrationTime>,
    #[serde(
        default,
        rename = "questionnaireScore",
        alias = "questionnaire_score",
        skip_serializing_if = "Option::is_none"
    )]
    pub questionnaire_score: Option<f64>,
    #[serde(
        default,
        rename = "questionnaireReviewSummary",
        alias = "questionnaire_review_summary",
        skip_serializing_if = "Option::is_none"
    )]
    pub questionnaire_review_summary: Option<String>,
}

impl UserRecord {
    /// A record with just the identifying fields, mostly for tests.
    pub fn new(username: impl Into<String>, email: impl Into<String>, status: UserStatus) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            status,
            registration_time: None,
            questionnaire_score: None,
            questionnaire_review_summary: None,
        }
    }
}

/// Pagination block as sent by the server; any field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationPatch {
    pub current_page: Option<u32>,
    pub page_size: Option<u32>,
    pub total_count: Option<u64>,
    pub total_pages: Option<u32>,
    pub has_next: Option<bool>,
    pub has_prev: Option<bool>,
}

/// Body of every `/admin/users` variant.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct UsersResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub users: Vec<UserRecord>,
    #[serde(default)]
    pub pagination: Option<PaginationPatch>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

impl UsersResponse {
    pub fn message(&self) -> Option<&str> {
        first_message(self.msg.as_deref(), self.message.as_deref())
    }
}

/// `{success, msg|message}` acknowledgement returned by most write calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    pub fn message(&self) -> Option<&str> {
        first_message(self.msg.as_deref(), self.message.as_deref())
    }
}

/// The server drops or nulls empty columns; read both as the default.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn first_message<'a>(msg: Option<&'a str>, message: Option<&'a str>) -> Option<&'a str> {
    msg.filter(|m| !m.is_empty())
        .or(message.filter(|m| !m.is_empty()))
}

/// Human-readable message of an arbitrary JSON body (`msg` wins over `message`).
pub fn body_message(body: &Value) -> Option<&str> {
    first_message(
        body.get("msg").and_then(Value::as_str),
        body.get("message").and_then(Value::as_str),
    )
}

#[derive(Debug, Clone, Serialize)]
pub struct AdminLoginRequest<'a> {
    pub password: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AdminLoginResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default, alias = "msg")]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest<'a> {
    pub token: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewRequest<'a> {
    pub username: &'a str,
    pub action: ReviewAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'a str>,
    pub language: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct UsernameRequest<'a> {
    pub username: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct LanguageRequest<'a> {
    pub language: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthmeConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub require_password: bool,
    #[serde(default)]
    pub password_regex: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptchaConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub email_enabled: bool,
    #[serde(default, rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub pass_score: i64,
    #[serde(default)]
    pub has_text_questions: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscordSettings {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BedrockConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub prefix: String,
    #[serde(default)]
    pub username_regex: String,
}

/// Public portal configuration. Fields this client does not model are kept in
/// `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalConfig {
    #[serde(default)]
    pub auth_methods: Vec<String>,
    #[serde(default)]
    pub theme: String,
    #[serde(default)]
    pub logo_url: String,
    #[serde(default)]
    pub announcement: String,
    #[serde(default)]
    pub username_regex: String,
    #[serde(default)]
    pub web_server_prefix: String,
    #[serde(default)]
    pub ws_port: Option<u16>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub authme: AuthmeConfig,
    #[serde(default)]
    pub captcha: CaptchaConfig,
    #[serde(default)]
    pub questionnaire: QuestionnaireSettings,
    #[serde(default)]
    pub discord: DiscordSettings,
    #[serde(default)]
    pub bedrock: BedrockConfig,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CaptchaResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub token: Option<String>,
    /// Base64 data URL of the challenge image.
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SendCodeRequest<'a> {
    pub email: &'a str,
    pub language: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Java,
    Bedrock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionnaireAnswer {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub selected_option_ids: Vec<i64>,
    #[serde(default)]
    pub text_answer: String,
}

/// Proof of a passed questionnaire, forwarded with the registration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionnaireSubmission {
    pub passed: bool,
    pub score: f64,
    pub pass_score: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manual_review_required: Option<bool>,
    pub answers: BTreeMap<String, QuestionnaireAnswer>,
    pub token: String,
    pub submitted_at: i64,
    pub expires_at: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub captcha_answer: Option<String>,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<Platform>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub questionnaire: Option<QuestionnaireSubmission>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    SingleChoice,
    MultipleChoice,
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuestionOption {
    pub id: i64,
    pub text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionInputMeta {
    pub min_selections: Option<u32>,
    pub max_selections: Option<u32>,
    pub min_length: Option<u32>,
    pub max_length: Option<u32>,
    pub multiline: Option<bool>,
    pub placeholder: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Question {
    pub id: i64,
    pub question: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub options: Vec<QuestionOption>,
    #[serde(default)]
    pub input: Option<QuestionInputMeta>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionnaireData {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct QuestionnaireConfigResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<QuestionnaireData>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitQuestionnaireRequest<'a> {
    pub answers: &'a BTreeMap<String, QuestionnaireAnswer>,
    pub language: &'a str,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SubmitQuestionnaireResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub passed: bool,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub pass_score: f64,
    #[serde(default)]
    pub manual_review_required: Option<bool>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub submitted_at: Option<i64>,
    #[serde(default)]
    pub expires_at: Option<i64>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserStatusData {
    pub status: String,
    #[serde(default)]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UserStatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub registered: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub data: Option<UserStatusData>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

impl UserStatusResponse {
    /// Status from either the flat or the `data`-wrapped response shape.
    pub fn status(&self) -> Option<&str> {
        self.status
            .as_deref()
            .or_else(|| self.data.as_ref().map(|data| data.status.as_str()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub current_version: Option<String>,
    #[serde(default)]
    pub latest_version: Option<String>,
    #[serde(default)]
    pub update_available: Option<bool>,
    #[serde(default)]
    pub releases_url: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscordAuthResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "url")]
    pub auth_url: Option<String>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default, alias = "globalName")]
    pub global_name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DiscordStatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub linked: bool,
    #[serde(default)]
    pub user: Option<DiscordUser>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct OnlinePlayer {
    pub name: String,
    #[serde(default)]
    pub uuid: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PlayerCounts {
    #[serde(default)]
    pub online: u32,
    #[serde(default)]
    pub max: u32,
    #[serde(default)]
    pub list: Vec<OnlinePlayer>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MemoryUsage {
    pub used: u64,
    pub max: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub online: bool,
    #[serde(default)]
    pub players: Option<PlayerCounts>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub tps: Option<f64>,
    #[serde(default)]
    pub memory: Option<MemoryUsage>,
    #[serde(default)]
    pub motd: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ServerStatusResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<ServerStatus>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DownloadResource {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct DownloadsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, alias = "data")]
    pub resources: Vec<DownloadResource>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditRecord {
    #[serde(default)]
    pub id: Option<i64>,
    pub action: String,
    #[serde(default)]
    pub operator: String,
    #[serde(default)]
    pub target: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub timestamp: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AuditResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub audits: Vec<AuditRecord>,
    #[serde(default, alias = "message")]
    pub msg: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_record_accepts_numeric_and_string_reg_time() {
        let numeric: UserRecord = serde_json::from_str(
            r#"{"username":"alice","email":"a@x.io","status":"approved","regTime":1700000000000,"questionnaire_score":88}"#,
        )
        .unwrap();
        assert_eq!(
            numeric.registration_time,
            Some(RegistrationTime::Millis(1_700_000_000_000))
        );
        assert_eq!(numeric.questionnaire_score, Some(88.0));
        assert_eq!(numeric.status, UserStatus::Approved);

        let text: UserRecord = serde_json::from_str(
            r#"{"username":"bob","email":"b@x.io","status":"PENDING","regTime":"2024-01-02 03:04"}"#,
        )
        .unwrap();
        assert_eq!(
            text.registration_time.as_ref().map(RegistrationTime::display),
            Some("2024-01-02 03:04".to_owned())
        );
        assert_eq!(text.status, UserStatus::Pending);
    }

    #[test]
    fn test_null_or_missing_columns_decode_as_defaults() {
        let record: UserRecord =
            serde_json::from_str(r#"{"username":"steve","email":null}"#).unwrap();
        assert_eq!(record.status, UserStatus::Other(String::new()));
        assert_eq!(record.email, "");

        let record: UserRecord =
            serde_json::from_str(r#"{"username":"steve","status":null}"#).unwrap();
        assert_eq!(record.status, UserStatus::default());

        let response: UsersResponse =
            serde_json::from_str(r#"{"success":true,"users":null}"#).unwrap();
        assert!(response.success);
        assert!(response.users.is_empty());
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let record: UserRecord =
            serde_json::from_str(r#"{"username":"x","status":"frozen"}"#).unwrap();
        assert_eq!(record.status, UserStatus::Other("frozen".to_owned()));
        assert_eq!(serde_json::to_value(&record.status).unwrap(), "frozen");
    }

    #[test]
    fn test_reg_time_display_formats_millis() {
        assert_eq!(
            RegistrationTime::Millis(0).display(),
            "1970-01-01 00:00".to_owned()
        );
    }

    #[test]
    fn test_users_response_with_partial_pagination() {
        let response: UsersResponse = serde_json::from_str(
            r#"{"success":true,"users":[],"pagination":{"currentPage":3}}"#,
        )
        .unwrap();
        let patch = response.pagination.unwrap();
        assert_eq!(patch.current_page, Some(3));
        assert_eq!(patch.total_count, None);
    }

    #[test]
    fn test_message_prefers_msg_and_skips_empty() {
        let ack = Ack {
            success: false,
            msg: Some(String::new()),
            message: Some("Authentication required".to_owned()),
        };
        assert_eq!(ack.message(), Some("Authentication required"));

        let body = serde_json::json!({"msg": "first", "message": "second"});
        assert_eq!(body_message(&body), Some("first"));
    }

    #[test]
    fn test_portal_config_keeps_unknown_fields() {
        let config: PortalConfig = serde_json::from_str(
            r#"{"authMethods":["email"],"theme":"glassx","captcha":{"enabled":true,"type":"math"},"enableEmailAliasLimit":true}"#,
        )
        .unwrap();
        assert_eq!(config.auth_methods, vec!["email".to_owned()]);
        assert!(config.captcha.enabled);
        assert_eq!(config.captcha.kind, "math");
        assert_eq!(
            config.extra.get("enableEmailAliasLimit"),
            Some(&Value::Bool(true))
        );
    }

    #[test]
    fn test_review_request_serialization() {
        let body = serde_json::to_value(ReviewRequest {
            username: "steve",
            action: ReviewAction::Reject,
            reason: None,
            language: "en",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"username":"steve","action":"reject","language":"en"})
        );
    }
}
