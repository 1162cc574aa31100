use std::sync::{Arc, Weak};
use std::time::Duration;

use log::{debug, warn};
use verifymc_states::{StateCell, StateReader, TaskSlot};

use super::state::AdminUsersState;
use super::tiers::{AdminUsersSource, ChainResult, TierQuery, run_chain};
use crate::i18n::Translate;
use crate::notification::Notifications;

/// Quiet period after the last search edit before the list reloads.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(500);

pub const ERROR_TITLE_KEY: &str = "common.error";
pub const LOAD_ERROR_KEY: &str = "admin.users.messages.load_error";
pub const NETWORK_ERROR_KEY: &str = "errors.network";

/// Marker owner for the search debounce task.
struct SearchDebounce;

/// The admin user list: the current page, search and pagination, and the
/// operations that reload it.
///
/// Each instance owns its own state. Dropping it (or calling
/// [`AdminUsers::dispose`]) cancels a pending search reload.
pub struct AdminUsers<S> {
    inner: Arc<Inner<S>>,
}

struct Inner<S> {
    source: Arc<S>,
    state: StateCell<AdminUsersState>,
    notifications: Notifications,
    translator: Arc<dyn Translate>,
    debounce: TaskSlot,
    debounce_delay: Duration,
}

/// Clears `loading` when a load ends, however it ends.
struct LoadingGuard<'a>(&'a StateCell<AdminUsersState>);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.update(|state| state.loading = false);
    }
}

impl<S> AdminUsers<S>
where
    S: AdminUsersSource + 'static,
{
    pub fn new(
        source: Arc<S>,
        notifications: Notifications,
        translator: Arc<dyn Translate>,
    ) -> Self {
        Self::with_state(source, notifications, translator, AdminUsersState::default())
    }

    pub fn with_state(
        source: Arc<S>,
        notifications: Notifications,
        translator: Arc<dyn Translate>,
        state: AdminUsersState,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                source,
                state: StateCell::new(state),
                notifications,
                translator,
                debounce: TaskSlot::new::<SearchDebounce>(),
                debounce_delay: SEARCH_DEBOUNCE,
            }),
        }
    }

    /// Override the search debounce window. Only valid before the handle is shared.
    pub fn with_search_debounce(mut self, delay: Duration) -> Self {
        if let Some(inner) = Arc::get_mut(&mut self.inner) {
            inner.debounce_delay = delay;
        }
        self
    }

    pub fn snapshot(&self) -> AdminUsersState {
        self.inner.state.get()
    }

    pub fn subscribe(&self) -> StateReader<AdminUsersState> {
        self.inner.state.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.state.read(|state| state.loading)
    }

    /// Load the current page, trying each data source in turn.
    ///
    /// Never fails: problems are reported through the notification sink and
    /// leave an empty list behind.
    pub async fn load_all_users(&self) {
        self.inner.load().await;
    }

    pub async fn handle_page_change(&self, page: u32) {
        self.inner
            .state
            .update(|state| state.pagination.current_page = page.max(1));
        self.inner.load().await;
    }

    pub async fn handle_page_size_change(&self, page_size: u32) {
        self.inner.state.update(|state| {
            state.page_size = page_size.max(1);
            state.pagination.current_page = 1;
        });
        self.inner.load().await;
    }

    /// Update the search text. The list reloads from page 1 once edits have
    /// been quiet for the debounce window; only the last edit counts.
    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        let changed = self.inner.state.read(|state| state.search_query != query);
        if !changed {
            return;
        }
        self.inner.state.update(|state| state.search_query = query);

        let weak: Weak<Inner<S>> = Arc::downgrade(&self.inner);
        self.inner
            .debounce
            .schedule(self.inner.debounce_delay, async move {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                inner
                    .state
                    .update(|state| state.pagination.current_page = 1);
                inner.load().await;
            });
    }

    /// Whether a search reload is waiting for its debounce window.
    pub fn is_search_pending(&self) -> bool {
        self.inner.debounce.is_pending()
    }

    pub fn reset_pagination(&self) {
        self.inner
            .state
            .update(|state| state.pagination.current_page = 1);
    }

    pub fn set_locale(&self, locale: impl Into<String>) {
        let locale = locale.into();
        self.inner.state.update(|state| state.locale = locale);
    }

    /// Release the pending search reload, if any.
    pub fn dispose(&self) {
        self.inner.debounce.cancel();
    }
}

impl<S> Drop for AdminUsers<S> {
    fn drop(&mut self) {
        self.inner.debounce.cancel();
    }
}

impl<S> Inner<S>
where
    S: AdminUsersSource,
{
    async fn load(&self) {
        self.state.update(|state| state.loading = true);
        let _loading = LoadingGuard(&self.state);

        let query = self.state.read(TierQuery::from_state);

        if let Err(err) = self.source.sync(&query.locale).await {
            warn!("AdminUsers: directory sync failed, continuing: {err}");
        }

        match run_chain(self.source.as_ref(), &query).await {
            Ok(ChainResult::Loaded(page)) => {
                debug!(
                    "AdminUsers: page {} holds {} of {} users",
                    page.pagination.current_page,
                    page.users.len(),
                    page.pagination.total_count
                );
                self.state.update(|state| {
                    state.users = page.users;
                    state.pagination = page.pagination;
                });
            }
            Ok(ChainResult::Empty(message)) => {
                self.state.update(AdminUsersState::clear_results);
                self.notify_load_error(message.as_deref(), LOAD_ERROR_KEY);
            }
            Err(err) => {
                warn!("AdminUsers: loading users failed: {err}");
                self.state.update(AdminUsersState::clear_results);
                self.notify_load_error(None, NETWORK_ERROR_KEY);
            }
        }
    }

    fn notify_load_error(&self, message: Option<&str>, fallback_key: &str) {
        let title = self.translator.t(ERROR_TITLE_KEY);
        let message = load_error_message(message, || self.translator.t(fallback_key));
        self.notifications.error(title, Some(message));
    }
}

/// Text of a load-failure notification: the server's message when it sent
/// a non-empty one (authentication explanations included), otherwise the
/// localized fallback.
pub fn load_error_message(message: Option<&str>, fallback: impl FnOnce() -> String) -> String {
    match message {
        Some(message) if !message.is_empty() => message.to_owned(),
        _ => fallback(),
    }
}
