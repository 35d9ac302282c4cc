//! Deferred release of module implementations
//!
//! Destroying a descriptor never frees its implementation on the spot: the
//! handle is queued here and freed when the owning container calls
//! [`ReleaseQueue::drain`] between call batches. A call that is still on the
//! stack holds its own strong reference, so draining while it runs only
//! frees the object once that call returns.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use parking_lot::Mutex;

/// Type-erased owned implementation handle
pub type ImplHandle = Arc<dyn Any + Send + Sync>;

struct Pending {
    module: String,
    handle: ImplHandle,
}

/// Shared queue of implementation handles awaiting release.
///
/// Cloning yields another handle to the same queue.
#[derive(Clone, Default)]
pub struct ReleaseQueue {
    pending: Arc<Mutex<Vec<Pending>>>,
}

impl ReleaseQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a handle for release
    pub fn defer(&self, module: impl Into<String>, handle: ImplHandle) {
        let module = module.into();
        tracing::debug!(module = %module, "deferring module release");
        self.pending.lock().push(Pending { module, handle });
    }

    /// Release every queued handle, returning how many were released
    pub fn drain(&self) -> usize {
        // Take the batch first so handles drop outside the lock.
        let batch = std::mem::take(&mut *self.pending.lock());
        let count = batch.len();
        for Pending { module, handle } in batch {
            tracing::trace!(module = %module, "releasing module");
            drop(handle);
        }
        if count > 0 {
            tracing::debug!(count, "drained release queue");
        }
        count
    }

    /// Number of handles awaiting release
    pub fn pending(&self) -> usize {
        self.pending.lock().len()
    }

    /// Check if nothing awaits release
    pub fn is_empty(&self) -> bool {
        self.pending() == 0
    }
}

impl fmt::Debug for ReleaseQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseQueue")
            .field("pending", &self.pending())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Tracked(Arc<AtomicUsize>);

    impl Drop for Tracked {
        fn drop(&mut self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_defer_then_drain() {
        let released = Arc::new(AtomicUsize::new(0));
        let queue = ReleaseQueue::new();

        queue.defer("Tracked", Arc::new(Tracked(Arc::clone(&released))));
        assert_eq!(queue.pending(), 1);
        assert_eq!(released.load(Ordering::SeqCst), 0);

        assert_eq!(queue.drain(), 1);
        assert_eq!(released.load(Ordering::SeqCst), 1);
        assert!(queue.is_empty());
        assert_eq!(queue.drain(), 0);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_clones_share_queue() {
        let queue = ReleaseQueue::new();
        let other = queue.clone();
        other.defer("Unit", Arc::new(()));
        assert_eq!(queue.pending(), 1);
        assert_eq!(queue.drain(), 1);
        assert!(other.is_empty());
    }

    #[test]
    fn test_outstanding_reference_delays_free() {
        let released = Arc::new(AtomicUsize::new(0));
        let queue = ReleaseQueue::new();
        let handle: ImplHandle = Arc::new(Tracked(Arc::clone(&released)));
        let in_flight = Arc::clone(&handle);

        queue.defer("Tracked", handle);
        queue.drain();
        assert_eq!(released.load(Ordering::SeqCst), 0);

        drop(in_flight);
        assert_eq!(released.load(Ordering::SeqCst), 1);
    }
}
