//! Business layer of the VerifyMC portal client.
//!
//! Everything here is front-end agnostic: storage, navigation, translation and
//! notification display are traits supplied by the embedding application.

pub mod admin_actions;
pub mod admin_users;
pub mod api;
mod config;
pub mod http;
pub mod i18n;
pub mod layout;
pub mod notification;
pub mod session;
pub mod socket;

pub use admin_actions::{AdminUserAction, AdminUserActions};
pub use admin_users::{AdminUsers, AdminUsersSource, AdminUsersState, PaginationState};
pub use api::{ApiClient, ApiError, ApiResult};
pub use config::{BusinessConfig, DEFAULT_LOCALE, DEFAULT_REQUEST_TIMEOUT, DEFAULT_SESSION_TTL};
pub use i18n::{Catalog, KeyTranslator, Translate};
pub use notification::{
    ChannelNotificationSystem, NotificationInput, NotificationKind, NotificationSystem,
    Notifications,
};
pub use session::{
    Clock, FixedClock, MemoryNavigator, MemoryStorage, Navigator, SessionStore, Storage,
    StorageError, SystemClock, UserInfo,
};
pub use socket::{ReconnectingSocket, SocketEvent, SocketOptions, SocketState};
