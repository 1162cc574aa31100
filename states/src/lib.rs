//! Reactive state primitives shared by the VerifyMC client crates.
//!
//! - [`StateCell`] / [`StateReader`]: an owned value whose changes can be observed.
//! - [`TaskSlot`]: a single-slot delayed task used for debounce and reconnect timers.

mod state;
mod task;

pub use state::{StateCell, StateReader};
pub use task::{TaskHandle, TaskId, TaskSlot};
