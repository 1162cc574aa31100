//! Single-slot delayed tasks with cooperative cancellation.
//!
//! - [`TaskId`]: identifies a scheduled task by owner type and generation.
//! - [`TaskHandle`]: a `TaskId` paired with its `CancellationToken`.
//! - [`TaskSlot`]: holds at most one pending delayed task. Scheduling a new task
//!   cancels the pending one, so rapid reschedules collapse into the last.
//!
//! Cancellation is only observed while a task is still waiting for its delay.
//! Once the delay elapses the task body runs to completion; this mirrors a
//! cleared timer, which stops a callback from firing but never interrupts one
//! that already fired.

use std::any::TypeId;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::trace;
use tokio_util::sync::CancellationToken;

/// Unique identifier for a scheduled task.
///
/// The `TypeId` names the owner (e.g. a search debounce or a reconnect timer)
/// and the generation distinguishes successive tasks of the same owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self {
            type_id,
            generation,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Higher generations were scheduled later.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Handle to a scheduled task with cooperative cancellation support.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    /// Request cancellation. A task that already fired is not interrupted.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}

/// Owner of at most one pending delayed task.
///
/// Dropping the slot cancels whatever is still pending, so a slot stored inside
/// a component is released together with the component.
#[derive(Debug)]
pub struct TaskSlot {
    owner: TypeId,
    generation: AtomicU64,
    pending: Mutex<Option<Pending>>,
}

#[derive(Debug)]
struct Pending {
    handle: TaskHandle,
    fired: Arc<AtomicBool>,
}

impl Pending {
    fn is_waiting(&self) -> bool {
        !self.handle.is_cancelled() && !self.fired.load(Ordering::Acquire)
    }
}

impl TaskSlot {
    /// Create an empty slot whose task ids carry the `TypeId` of `Owner`.
    pub fn new<Owner: 'static>() -> Self {
        Self {
            owner: TypeId::of::<Owner>(),
            generation: AtomicU64::new(0),
            pending: Mutex::new(None),
        }
    }

    fn pending(&self) -> MutexGuard<'_, Option<Pending>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cancel any pending task and schedule `task` to run after `delay`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn schedule<F>(&self, delay: Duration, task: F) -> TaskId
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let id = TaskId::new(self.owner, generation);
        let token = CancellationToken::new();
        let fired = Arc::new(AtomicBool::new(false));
        let pending = Pending {
            handle: TaskHandle::new(id, token.clone()),
            fired: Arc::clone(&fired),
        };

        if let Some(previous) = self.pending().replace(pending) {
            if previous.is_waiting() {
                trace!(
                    "TaskSlot: replacing pending task generation {}",
                    previous.handle.id().generation()
                );
            }
            previous.handle.cancel();
        }

        tokio::spawn(async move {
            tokio::select! {
                biased;
                () = token.cancelled() => return,
                () = tokio::time::sleep(delay) => {}
            }
            fired.store(true, Ordering::Release);
            task.await;
        });

        id
    }

    /// Cancel the pending task, if any.
    pub fn cancel(&self) {
        if let Some(pending) = self.pending().take() {
            pending.handle.cancel();
        }
    }

    /// Whether a scheduled task is still waiting for its delay.
    pub fn is_pending(&self) -> bool {
        self.pending().as_ref().is_some_and(Pending::is_waiting)
    }

    /// Id of the task still waiting for its delay, if any.
    pub fn pending_id(&self) -> Option<TaskId> {
        self.pending()
            .as_ref()
            .filter(|pending| pending.is_waiting())
            .map(|pending| pending.handle.id())
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}
