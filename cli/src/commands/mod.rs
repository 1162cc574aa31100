//! Command implementations for the VerifyMC CLI.

pub mod completions;
pub mod moderate;
pub mod server;
pub mod session;
pub mod users;
pub mod watch;

pub use completions::generate_completions;
pub use moderate::{run_action, run_passwd};
pub use server::{run_audits, run_server_status, run_version};
pub use session::{ensure_authenticated, run_login, run_logout, run_whoami};
pub use users::run_users;
pub use watch::run_watch;
