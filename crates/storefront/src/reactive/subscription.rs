//! Subscription handles.

use std::fmt;
use std::sync::Weak;
use std::sync::atomic::{AtomicBool, Ordering};

/// Something observers can be detached from.
pub(super) trait Detach: Send + Sync {
    fn detach(&self, id: u64);
}

/// Handle to a registered observer.
///
/// Unsubscribing removes the observer from future deliveries and has no
/// other effect on the source. Calling [`Subscription::unsubscribe`] more
/// than once is a no-op. Dropping the handle does not unsubscribe.
pub struct Subscription {
    id: u64,
    source: Weak<dyn Detach>,
    closed: AtomicBool,
}

impl Subscription {
    pub(super) fn new(id: u64, source: Weak<dyn Detach>) -> Self {
        Self {
            id,
            source,
            closed: AtomicBool::new(false),
        }
    }

    /// Stop receiving values.
    ///
    /// Returns `true` if this call released the observer, `false` if the
    /// subscription was already closed.
    pub fn unsubscribe(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return false;
        }
        if let Some(source) = self.source.upgrade() {
            source.detach(self.id);
        }
        true
    }

    /// Whether this subscription will receive no further values, either
    /// because it was unsubscribed or because its source is gone.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst) || self.source.strong_count() == 0
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}
