//! Shared fixtures for business-layer integration tests.

#![expect(dead_code, reason = "each test binary uses a different subset of these fixtures")]

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use verifymc_business::api::{PaginationPatch, UserRecord, UserStatus, UsersResponse};
use verifymc_business::http::HttpError;
use verifymc_business::{
    AdminUsers, AdminUsersSource, AdminUsersState, ApiClient, ApiError, ApiResult,
    BusinessConfig, ChannelNotificationSystem, KeyTranslator, MemoryNavigator, MemoryStorage,
    NotificationInput, Notifications, SessionStore,
};
use wiremock::MockServer;

pub fn init_logging() {
    env_logger::builder().is_test(true).try_init().ok();
}

pub fn user(username: &str, email: &str) -> UserRecord {
    UserRecord::new(username, email, UserStatus::Pending)
}

pub fn users_json(users: &[(&str, &str)]) -> serde_json::Value {
    users
        .iter()
        .map(|(username, email)| {
            serde_json::json!({
                "username": username,
                "email": email,
                "status": "pending",
                "regTime": 1_700_000_000_000_i64,
            })
        })
        .collect()
}

/// Mock server plus an API client wired to an in-memory session.
pub struct TestContext {
    pub mock_server: MockServer,
    pub navigator: Arc<MemoryNavigator>,
    pub session: Arc<SessionStore>,
    pub api: ApiClient,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_location("/admin").await
    }

    pub async fn with_location(location: &str) -> Self {
        init_logging();
        let mock_server = MockServer::start().await;
        let navigator = Arc::new(MemoryNavigator::new(location));
        let session = Arc::new(SessionStore::new(
            Arc::new(MemoryStorage::new()),
            navigator.clone(),
        ));
        let config = BusinessConfig::new(mock_server.uri()).with_timeout(Duration::from_secs(2));
        let api = ApiClient::new(config, session.clone());

        Self {
            mock_server,
            navigator,
            session,
            api,
        }
    }

    pub fn set_authenticated(&self, token: &str) {
        self.session
            .set_session(token, None)
            .expect("memory storage never fails");
        self.session
            .set_admin_status(true)
            .expect("memory storage never fails");
    }
}

/// Notification sink that records everything it is shown.
pub fn recording_notifications() -> (Notifications, flume::Receiver<NotificationInput>) {
    let (system, receiver) = ChannelNotificationSystem::new();
    (Notifications::with_system(Arc::new(system)), receiver)
}

/// What a scripted endpoint answers.
#[derive(Debug, Clone)]
pub enum Reply {
    Users(UsersResponse),
    NetworkError,
}

impl Reply {
    pub fn ok(users: Vec<UserRecord>) -> Self {
        Self::Users(UsersResponse {
            success: true,
            users,
            ..UsersResponse::default()
        })
    }

    pub fn paged(users: Vec<UserRecord>, pagination: PaginationPatch) -> Self {
        Self::Users(UsersResponse {
            success: true,
            users,
            pagination: Some(pagination),
            ..UsersResponse::default()
        })
    }

    /// A reply decoded from a raw response body, as the API client would.
    pub fn from_json(body: serde_json::Value) -> Self {
        Self::Users(serde_json::from_value(body).expect("body should decode"))
    }

    pub fn refused(message: &str) -> Self {
        Self::Users(UsersResponse {
            success: false,
            message: Some(message.to_owned()),
            ..UsersResponse::default()
        })
    }

    fn into_result(self) -> ApiResult<UsersResponse> {
        match self {
            Self::Users(response) => Ok(response),
            Self::NetworkError => Err(ApiError::Http(HttpError::Network(
                "connection refused".to_owned(),
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Sync(String),
    Paginated {
        page: u32,
        page_size: u32,
        search: String,
    },
    Pending(String),
    All,
}

/// In-memory user source with scripted replies and a call log.
pub struct MockSource {
    pub paginated: Mutex<Reply>,
    pub pending: Mutex<Reply>,
    pub all: Mutex<Reply>,
    pub sync_fails: Mutex<bool>,
    /// Delay before the paginated reply, to observe in-flight state.
    pub paginated_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<Call>>,
}

impl Default for MockSource {
    fn default() -> Self {
        Self {
            paginated: Mutex::new(Reply::ok(Vec::new())),
            pending: Mutex::new(Reply::ok(Vec::new())),
            all: Mutex::new(Reply::ok(Vec::new())),
            sync_fails: Mutex::new(false),
            paginated_delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }
}

fn get<T: Clone>(value: &Mutex<T>) -> T {
    value.lock().unwrap_or_else(PoisonError::into_inner).clone()
}

impl MockSource {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_paginated(&self, reply: Reply) {
        *self.paginated.lock().unwrap() = reply;
    }

    pub fn set_pending(&self, reply: Reply) {
        *self.pending.lock().unwrap() = reply;
    }

    pub fn set_all(&self, reply: Reply) {
        *self.all.lock().unwrap() = reply;
    }

    pub fn calls(&self) -> Vec<Call> {
        get(&self.calls)
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| predicate(call)).count()
    }

    pub fn paginated_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, Call::Paginated { .. }))
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl AdminUsersSource for MockSource {
    async fn sync(&self, language: &str) -> ApiResult<()> {
        self.record(Call::Sync(language.to_owned()));
        if get(&self.sync_fails) {
            return Err(ApiError::Http(HttpError::Timeout(Duration::from_secs(10))));
        }
        Ok(())
    }

    async fn fetch_paginated(
        &self,
        page: u32,
        page_size: u32,
        search: &str,
    ) -> ApiResult<UsersResponse> {
        self.record(Call::Paginated {
            page,
            page_size,
            search: search.to_owned(),
        });
        if let Some(delay) = get(&self.paginated_delay) {
            tokio::time::sleep(delay).await;
        }
        get(&self.paginated).into_result()
    }

    async fn fetch_pending(&self, language: &str) -> ApiResult<UsersResponse> {
        self.record(Call::Pending(language.to_owned()));
        get(&self.pending).into_result()
    }

    async fn fetch_all(&self) -> ApiResult<UsersResponse> {
        self.record(Call::All);
        get(&self.all).into_result()
    }
}

/// Loader over `source` with key-echoing translations and a recording sink.
pub fn admin_users(
    source: &Arc<MockSource>,
    state: AdminUsersState,
) -> (
    AdminUsers<MockSource>,
    flume::Receiver<NotificationInput>,
) {
    let (notifications, receiver) = recording_notifications();
    let users = AdminUsers::with_state(
        Arc::clone(source),
        notifications,
        Arc::new(KeyTranslator),
        state,
    );
    (users, receiver)
}
