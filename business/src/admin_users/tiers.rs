//! Data sources for the user list, tried in priority order.
//!
//! Servers differ in what `/admin/users` supports. The loader asks for a
//! server-paginated page first, then falls back to the pending list and finally
//! to the full list, paging those locally.

use async_trait::async_trait;
use log::{debug, warn};

use super::search::{apply_search, paginate};
use super::state::{AdminUsersState, PaginationState};
use crate::api::{ApiClient, ApiResult, UserRecord, UsersResponse};

/// Where the loader gets users from.
#[async_trait]
pub trait AdminUsersSource: Send + Sync {
    /// Best-effort refresh of the server's account directory.
    async fn sync(&self, language: &str) -> ApiResult<()>;
    async fn fetch_paginated(
        &self,
        page: u32,
        page_size: u32,
        search: &str,
    ) -> ApiResult<UsersResponse>;
    async fn fetch_pending(&self, language: &str) -> ApiResult<UsersResponse>;
    async fn fetch_all(&self) -> ApiResult<UsersResponse>;
}

#[async_trait]
impl AdminUsersSource for ApiClient {
    async fn sync(&self, language: &str) -> ApiResult<()> {
        let ack = self.sync_directory(language).await?;
        if !ack.success {
            debug!(
                "AdminUsersSource: directory sync declined: {}",
                ack.message().unwrap_or_default()
            );
        }
        Ok(())
    }

    async fn fetch_paginated(
        &self,
        page: u32,
        page_size: u32,
        search: &str,
    ) -> ApiResult<UsersResponse> {
        self.users_paginated(page, page_size, search).await
    }

    async fn fetch_pending(&self, language: &str) -> ApiResult<UsersResponse> {
        self.pending_list(language).await
    }

    async fn fetch_all(&self) -> ApiResult<UsersResponse> {
        self.all_users().await
    }
}

/// Inputs of one load, captured when it starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TierQuery {
    pub page: u32,
    pub page_size: u32,
    pub search: String,
    pub locale: String,
}

impl TierQuery {
    pub fn from_state(state: &AdminUsersState) -> Self {
        Self {
            page: state.current_page(),
            page_size: state.page_size,
            search: state.search_query.clone(),
            locale: state.locale.clone(),
        }
    }
}

/// A page of users with its pagination.
#[derive(Debug, Clone, PartialEq)]
pub struct UsersPage {
    pub users: Vec<UserRecord>,
    pub pagination: PaginationState,
}

impl UsersPage {
    /// Filter and page a full list locally.
    pub fn from_full_list(users: &[UserRecord], query: &TierQuery) -> Self {
        let filtered = apply_search(users, &query.search);
        Self {
            users: paginate(&filtered, query.page, query.page_size),
            pagination: PaginationState::manual(filtered.len(), query.page, query.page_size),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TierOutcome {
    Satisfied(UsersPage),
    /// Nothing usable here; carries the server message, if any.
    TryNext(Option<String>),
    /// The server refused the request; stop with its message.
    Halt(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Paginated,
    PendingOnly,
    AllUsers,
}

impl Tier {
    pub const CHAIN: [Tier; 3] = [Tier::Paginated, Tier::PendingOnly, Tier::AllUsers];

    /// Run this tier. Errors are only returned for failures that should end
    /// the whole load.
    pub async fn attempt<S>(self, source: &S, query: &TierQuery) -> ApiResult<TierOutcome>
    where
        S: AdminUsersSource + ?Sized,
    {
        match self {
            Tier::Paginated => {
                let response = source
                    .fetch_paginated(query.page, query.page_size, &query.search)
                    .await?;
                let message = response.message().map(str::to_owned);
                if !response.success {
                    return Ok(TierOutcome::Halt(message));
                }
                if response.users.is_empty() {
                    return Ok(TierOutcome::TryNext(message));
                }
                Ok(TierOutcome::Satisfied(UsersPage {
                    pagination: PaginationState::from_patch(response.pagination.as_ref()),
                    users: response.users,
                }))
            }
            Tier::PendingOnly => match source.fetch_pending(&query.locale).await {
                Ok(response) => Ok(local_page(response, query)),
                Err(err) => {
                    warn!("AdminUsers: pending list failed, falling back: {err}");
                    Ok(TierOutcome::TryNext(None))
                }
            },
            Tier::AllUsers => {
                let response = source.fetch_all().await?;
                Ok(local_page(response, query))
            }
        }
    }
}

fn local_page(response: UsersResponse, query: &TierQuery) -> TierOutcome {
    if response.success && !response.users.is_empty() {
        TierOutcome::Satisfied(UsersPage::from_full_list(&response.users, query))
    } else {
        TierOutcome::TryNext(None)
    }
}

/// Result of running the whole chain.
#[derive(Debug, Clone, PartialEq)]
pub enum ChainResult {
    Loaded(UsersPage),
    /// No tier produced users. The message is the first one a tier reported.
    Empty(Option<String>),
}

pub async fn run_chain<S>(source: &S, query: &TierQuery) -> ApiResult<ChainResult>
where
    S: AdminUsersSource + ?Sized,
{
    let mut message = None;
    for tier in Tier::CHAIN {
        match tier.attempt(source, query).await? {
            TierOutcome::Satisfied(page) => {
                debug!(
                    "AdminUsers: {tier:?} returned {} users",
                    page.users.len()
                );
                return Ok(ChainResult::Loaded(page));
            }
            TierOutcome::TryNext(next) => {
                message = message.or(next);
            }
            TierOutcome::Halt(halt) => return Ok(ChainResult::Empty(halt)),
        }
    }
    Ok(ChainResult::Empty(message))
}
