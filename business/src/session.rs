//! Session store for the admin portal.
//!
//! Credentials live in a [`Storage`] backend under four keys that are always
//! cleared together. A token whose expiry has passed is treated exactly like a
//! missing one and is removed the first time it is looked at.
//!
//! Session invalidation clears the stored credentials and sends the
//! [`Navigator`] to the login page, remembering where the user was so the
//! login flow can return there.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const ADMIN_TOKEN_KEY: &str = "admin_token";
pub const IS_ADMIN_KEY: &str = "is_admin";
pub const USER_INFO_KEY: &str = "user_info";
pub const TOKEN_EXPIRY_KEY: &str = "token_expiry";
pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage serialization error: {0}")]
    Serialize(String),
}

/// Durable string key/value storage.
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage, used by tests and short-lived tools.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries().insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries().remove(key);
        Ok(())
    }
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: chrono::Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Where the user is and how to send them elsewhere.
pub trait Navigator: Send + Sync {
    /// Current path, query and fragment, e.g. `/dashboard?tab=users#top`.
    fn current_location(&self) -> String;
    fn assign(&self, destination: &str);
}

/// Navigator that just records the location. Useful for headless front ends.
#[derive(Debug)]
pub struct MemoryNavigator {
    location: Mutex<String>,
    history: Mutex<Vec<String>>,
}

impl MemoryNavigator {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: Mutex::new(location.into()),
            history: Mutex::new(Vec::new()),
        }
    }

    /// Every destination passed to `assign`, oldest first.
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl Default for MemoryNavigator {
    fn default() -> Self {
        Self::new("/")
    }
}

impl Navigator for MemoryNavigator {
    fn current_location(&self) -> String {
        self.location
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn assign(&self, destination: &str) {
        destination.clone_into(&mut self.location.lock().unwrap_or_else(PoisonError::into_inner));
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(destination.to_owned());
    }
}

/// Profile of the signed-in user, stored as JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
}

/// Strip the `#fragment` from a location.
fn without_fragment(location: &str) -> &str {
    location.split_once('#').map_or(location, |(head, _)| head)
}

/// Login page URL that returns to `target` after signing in.
///
/// No `redirect` parameter is added when the target is the login page itself.
pub fn login_destination(target: &str) -> String {
    let is_login =
        target == LOGIN_PATH || target.starts_with(&format!("{LOGIN_PATH}?"));
    if target.is_empty() || is_login {
        LOGIN_PATH.to_owned()
    } else {
        format!("{LOGIN_PATH}?redirect={}", urlencoding::encode(target))
    }
}

/// Value of `name` in the query string of `location`, percent-decoded.
fn query_param(location: &str, name: &str) -> Option<String> {
    let (_, query) = without_fragment(location).split_once('?')?;
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        if key != name {
            return None;
        }
        let value = value.replace('+', " ");
        urlencoding::decode(&value).ok().map(|v| v.into_owned())
    })
}

pub struct SessionStore {
    storage: Arc<dyn Storage>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("has_token", &self.storage.get(ADMIN_TOKEN_KEY).is_some())
            .finish_non_exhaustive()
    }
}

impl SessionStore {
    pub fn new(storage: Arc<dyn Storage>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            storage,
            navigator,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// In-memory session for tests and one-off tools.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(MemoryNavigator::default()),
        )
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.storage.get(TOKEN_EXPIRY_KEY)?;
        match DateTime::parse_from_rfc3339(&raw) {
            Ok(at) => Some(at.with_timezone(&Utc)),
            Err(err) => {
                warn!("SessionStore: ignoring unreadable token expiry {raw:?}: {err}");
                None
            }
        }
    }

    /// The stored token, if present and not expired.
    ///
    /// An expired token is cleared as a side effect.
    pub fn token(&self) -> Option<String> {
        let token = self.storage.get(ADMIN_TOKEN_KEY)?;
        if let Some(expires_at) = self.expires_at()
            && self.clock.now() >= expires_at
        {
            info!("SessionStore: token expired at {expires_at}, clearing session");
            self.clear_token();
            return None;
        }
        Some(token)
    }

    pub fn set_token(&self, token: &str) -> Result<(), StorageError> {
        self.storage.set(ADMIN_TOKEN_KEY, token)
    }

    /// Store a token together with its expiry. `None` never expires client-side.
    pub fn set_session(
        &self,
        token: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), StorageError> {
        self.set_token(token)?;
        match expires_at {
            Some(at) => self.storage.set(TOKEN_EXPIRY_KEY, &at.to_rfc3339()),
            None => self.storage.remove(TOKEN_EXPIRY_KEY),
        }
    }

    /// Store a freshly issued token that expires `ttl` from now.
    pub fn start_session(&self, token: &str, ttl: std::time::Duration) -> Result<(), StorageError> {
        let expires_at = chrono::Duration::from_std(ttl)
            .ok()
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl));
        self.set_session(token, expires_at)
    }

    /// Remove token, admin flag, user info and expiry.
    pub fn clear_token(&self) {
        for key in [ADMIN_TOKEN_KEY, IS_ADMIN_KEY, USER_INFO_KEY, TOKEN_EXPIRY_KEY] {
            if let Err(err) = self.storage.remove(key) {
                warn!("SessionStore: failed to remove {key}: {err}");
            }
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.storage.get(IS_ADMIN_KEY).as_deref() == Some("true")
    }

    pub fn set_admin_status(&self, is_admin: bool) -> Result<(), StorageError> {
        self.storage
            .set(IS_ADMIN_KEY, if is_admin { "true" } else { "false" })
    }

    /// Stored user info; unreadable JSON reads as `None`.
    pub fn user_info(&self) -> Option<UserInfo> {
        let raw = self.storage.get(USER_INFO_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    pub fn set_user_info(&self, user_info: &UserInfo) -> Result<(), StorageError> {
        let raw = serde_json::to_string(user_info)
            .map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.storage.set(USER_INFO_KEY, &raw)?;
        if let Some(is_admin) = user_info.is_admin {
            self.set_admin_status(is_admin)?;
        }
        Ok(())
    }

    /// Post-login return target from the `redirect` query parameter.
    ///
    /// Only same-site absolute paths are accepted.
    pub fn post_login_redirect(&self) -> Option<String> {
        query_param(&self.navigator.current_location(), "redirect")
            .filter(|redirect| redirect.starts_with('/'))
    }

    /// Send the navigator to the login page.
    ///
    /// `redirect` defaults to the current location.
    pub fn redirect_to_login(&self, redirect: Option<&str>) {
        let current = self.navigator.current_location();
        let target = redirect.unwrap_or(&current);
        let destination = login_destination(target);

        if without_fragment(&current) != destination {
            debug!("SessionStore: redirecting to {destination}");
            self.navigator.assign(&destination);
        }
    }

    /// Clear credentials and redirect to login.
    pub fn handle_unauthorized(&self, redirect: Option<&str>) {
        self.clear_token();
        self.redirect_to_login(redirect);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixture(location: &str) -> (SessionStore, Arc<MemoryNavigator>, Arc<FixedClock>) {
        let navigator = Arc::new(MemoryNavigator::new(location));
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2026, 1, 1, 12, 0, 0).unwrap(),
        ));
        let session = SessionStore::new(Arc::new(MemoryStorage::new()), navigator.clone())
            .with_clock(clock.clone());
        (session, navigator, clock)
    }

    #[test]
    fn test_token_roundtrip_without_expiry() {
        let (session, _, _) = fixture("/");
        assert!(!session.is_authenticated());

        session.set_token("abc").unwrap();
        assert_eq!(session.token().as_deref(), Some("abc"));
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_expired_token_is_cleared_on_check() {
        let (session, _, clock) = fixture("/");
        let expires_at = clock.now() + chrono::Duration::minutes(30);
        session.set_session("abc", Some(expires_at)).unwrap();
        session.set_admin_status(true).unwrap();

        assert!(session.is_authenticated());

        clock.advance(chrono::Duration::minutes(31));
        assert!(!session.is_authenticated());
        assert!(session.storage().get(ADMIN_TOKEN_KEY).is_none());
        assert!(session.storage().get(TOKEN_EXPIRY_KEY).is_none());
        assert!(!session.is_admin());
    }

    #[test]
    fn test_start_session_sets_expiry_from_ttl() {
        let (session, _, clock) = fixture("/");
        session
            .start_session("abc", std::time::Duration::from_secs(3600))
            .unwrap();
        assert_eq!(
            session.expires_at(),
            Some(clock.now() + chrono::Duration::hours(1))
        );

        clock.advance(chrono::Duration::minutes(59));
        assert!(session.is_authenticated());
        clock.advance(chrono::Duration::minutes(1));
        assert!(!session.is_authenticated());
    }

    #[test]
    fn test_clear_token_removes_all_keys() {
        let (session, _, _) = fixture("/");
        session.set_session("abc", None).unwrap();
        session
            .set_user_info(&UserInfo {
                username: "admin".to_owned(),
                email: None,
                is_admin: Some(true),
            })
            .unwrap();
        assert!(session.is_admin());

        session.clear_token();

        for key in [ADMIN_TOKEN_KEY, IS_ADMIN_KEY, USER_INFO_KEY, TOKEN_EXPIRY_KEY] {
            assert!(session.storage().get(key).is_none(), "{key} should be cleared");
        }
    }

    #[test]
    fn test_user_info_corrupt_json_reads_as_none() {
        let (session, _, _) = fixture("/");
        session.storage().set(USER_INFO_KEY, "{not json").unwrap();
        assert!(session.user_info().is_none());
    }

    #[test]
    fn test_user_info_without_admin_flag_keeps_flag() {
        let (session, _, _) = fixture("/");
        session.set_admin_status(true).unwrap();
        session
            .set_user_info(&UserInfo {
                username: "steve".to_owned(),
                email: Some("steve@example.com".to_owned()),
                is_admin: None,
            })
            .unwrap();
        assert!(session.is_admin());
        assert_eq!(session.user_info().unwrap().username, "steve");
    }

    #[test]
    fn test_login_destination() {
        assert_eq!(login_destination("/login"), "/login");
        assert_eq!(login_destination("/login?redirect=%2Fa"), "/login");
        assert_eq!(login_destination(""), "/login");
        assert_eq!(
            login_destination("/dashboard?tab=users"),
            "/login?redirect=%2Fdashboard%3Ftab%3Dusers"
        );
    }

    #[test]
    fn test_handle_unauthorized_preserves_location() {
        let (session, navigator, _) = fixture("/dashboard?tab=users");
        session.set_token("abc").unwrap();

        session.handle_unauthorized(None);

        assert!(!session.is_authenticated());
        assert_eq!(
            navigator.history(),
            vec!["/login?redirect=%2Fdashboard%3Ftab%3Dusers".to_owned()]
        );
        assert_eq!(
            session.post_login_redirect().as_deref(),
            Some("/dashboard?tab=users")
        );
    }

    #[test]
    fn test_redirect_skipped_when_already_there() {
        let (session, navigator, _) = fixture("/login");
        session.redirect_to_login(None);
        assert!(navigator.history().is_empty());
    }

    #[test]
    fn test_post_login_redirect_rejects_external_targets() {
        let (session, _, _) = fixture("/login?redirect=https%3A%2F%2Fevil.example");
        assert!(session.post_login_redirect().is_none());

        let (session, _, _) = fixture("/login");
        assert!(session.post_login_redirect().is_none());
    }
}
