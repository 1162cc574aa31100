//! Admin user list: tiered loading, local search and paging, debounced reloads.

mod loader;
mod search;
mod state;
mod tiers;

pub use loader::{
    AdminUsers, ERROR_TITLE_KEY, LOAD_ERROR_KEY, NETWORK_ERROR_KEY, SEARCH_DEBOUNCE,
    load_error_message,
};
pub use search::{apply_search, paginate};
pub use state::{AdminUsersState, DEFAULT_PAGE_SIZE, PaginationState};
pub use tiers::{
    AdminUsersSource, ChainResult, Tier, TierOutcome, TierQuery, UsersPage, run_chain,
};
