//! Observable state cells.
//!
//! A [`StateCell`] owns one value and publishes every mutation to any number of
//! [`StateReader`]s. Readers always observe the latest value; intermediate
//! values may be skipped if a reader falls behind.

use tokio::sync::watch;

/// Owner side of an observable value.
#[derive(Debug)]
pub struct StateCell<T> {
    send: watch::Sender<T>,
}

impl<T: Default> Default for StateCell<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T> StateCell<T> {
    pub fn new(value: T) -> Self {
        let (send, _recv) = watch::channel(value);
        Self { send }
    }

    /// Run `f` against the current value without notifying readers.
    pub fn read<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.send.borrow())
    }

    /// Mutate the value in place and notify readers.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        self.send.send_modify(f);
    }

    /// Replace the value and notify readers.
    pub fn set(&self, value: T) {
        self.send.send_replace(value);
    }

    /// Create a reader positioned at the current value.
    pub fn subscribe(&self) -> StateReader<T> {
        StateReader {
            recv: self.send.subscribe(),
        }
    }
}

impl<T: Clone> StateCell<T> {
    pub fn get(&self) -> T {
        self.send.borrow().clone()
    }
}

/// Read side of a [`StateCell`].
#[derive(Debug, Clone)]
pub struct StateReader<T> {
    recv: watch::Receiver<T>,
}

impl<T: Clone> StateReader<T> {
    /// Latest value, marking it as seen.
    pub fn read(&mut self) -> T {
        self.recv.borrow_and_update().clone()
    }
}

impl<T> StateReader<T> {
    /// Wait until the cell changes.
    ///
    /// Returns `false` once the owning cell has been dropped.
    pub async fn changed(&mut self) -> bool {
        self.recv.changed().await.is_ok()
    }

    /// Whether the cell changed since the last [`StateReader::read`].
    pub fn has_changed(&self) -> bool {
        self.recv.has_changed().unwrap_or(false)
    }
}
