use crate::api::{PaginationPatch, UserRecord};
use crate::config::DEFAULT_LOCALE;

pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Pagination metadata exposed with the current page of users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    pub current_page: u32,
    pub total_count: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            current_page: 1,
            total_count: 0,
            total_pages: 0,
            has_next: false,
            has_prev: false,
        }
    }
}

impl PaginationState {
    /// Adopt a server-provided block as is, filling in missing fields.
    pub fn from_patch(patch: Option<&PaginationPatch>) -> Self {
        let defaults = Self::default();
        let Some(patch) = patch else {
            return defaults;
        };
        Self {
            current_page: patch.current_page.unwrap_or(defaults.current_page),
            total_count: patch.total_count.unwrap_or(defaults.total_count),
            total_pages: patch.total_pages.unwrap_or(defaults.total_pages),
            has_next: patch.has_next.unwrap_or(defaults.has_next),
            has_prev: patch.has_prev.unwrap_or(defaults.has_prev),
        }
    }

    /// Derive pagination for a list that is paged locally.
    pub fn manual(total_count: usize, page: u32, page_size: u32) -> Self {
        let total_count = total_count as u64;
        let total_pages = total_count.div_ceil(u64::from(page_size.max(1)));
        let total_pages = u32::try_from(total_pages).unwrap_or(u32::MAX);
        Self {
            current_page: page,
            total_count,
            total_pages,
            has_next: page < total_pages,
            has_prev: page > 1,
        }
    }
}

/// Everything the user list view renders.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminUsersState {
    pub loading: bool,
    /// Current page only.
    pub users: Vec<UserRecord>,
    pub search_query: String,
    pub page_size: u32,
    pub pagination: PaginationState,
    /// Language sent with the sync and pending-list calls.
    pub locale: String,
}

impl Default for AdminUsersState {
    fn default() -> Self {
        Self {
            loading: false,
            users: Vec::new(),
            search_query: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
            pagination: PaginationState::default(),
            locale: DEFAULT_LOCALE.to_owned(),
        }
    }
}

impl AdminUsersState {
    pub fn current_page(&self) -> u32 {
        self.pagination.current_page
    }

    /// Drop the loaded page and reset pagination.
    pub(crate) fn clear_results(&mut self) {
        self.users.clear();
        self.pagination = PaginationState::default();
    }
}
