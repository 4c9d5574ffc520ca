//! Lock-guarded generator state.
//!
//! State is only reachable through [`Guarded::with`], so every read or
//! mutation happens inside the critical section.

use super::fatal;
use std::sync::Mutex;

pub(crate) struct Guarded<T> {
    inner: Mutex<T>,
}

impl<T> Guarded<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Runs `f` with exclusive access to the state.
    ///
    /// A poisoned lock means a panic escaped a critical section and the
    /// bookkeeping can no longer be trusted, so the process aborts.
    pub(crate) fn with<R>(&self, f: impl FnOnce(&mut T) -> R) -> R {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(_) => fatal("generator lock poisoned"),
        };
        f(&mut guard)
    }
}
