use std::sync::{Arc, Mutex};

use crate::adapter::DriverAdapter;
use crate::provider::DbClientProvider;

/// A provider shared between threads behind one lock.
///
/// Every call through [`with`](Self::with) holds the lock for its whole duration, so a
/// transaction spanning several statements should run inside a single closure.
pub struct SharedProvider<A: DriverAdapter> {
    inner: Arc<Mutex<DbClientProvider<A>>>,
}

impl<A: DriverAdapter> SharedProvider<A> {
    #[must_use]
    pub fn new(provider: DbClientProvider<A>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(provider)),
        }
    }

    /// Run `f` with exclusive access to the provider.
    pub fn with<R>(&self, f: impl FnOnce(&mut DbClientProvider<A>) -> R) -> R {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => {
                // A panic mid-call leaves the provider usable; its state is whatever the
                // driver left behind.
                poisoned.into_inner()
            }
        };
        f(&mut guard)
    }
}

impl<A: DriverAdapter> Clone for SharedProvider<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
