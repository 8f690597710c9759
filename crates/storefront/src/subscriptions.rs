//! Grouped subscription lifetimes.
//!
//! A view that subscribes to several streams (cart items, cart total,
//! wishlist membership) registers every handle in one
//! [`SubscriptionContainer`] and releases them all together.

use crate::reactive::Subscription;

/// Owns a set of subscriptions and releases them together.
#[derive(Debug, Default)]
pub struct SubscriptionContainer {
    subscriptions: Vec<Subscription>,
}

impl SubscriptionContainer {
    /// Create an empty container.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscription for later disposal.
    pub fn add(&mut self, subscription: Subscription) {
        self.subscriptions.push(subscription);
    }

    /// Unsubscribe every still-active subscription and empty the container.
    ///
    /// Returns the number of subscriptions this call released. Handles that
    /// were already closed are skipped, so nothing is released twice.
    pub fn dispose(&mut self) -> usize {
        let released = self
            .subscriptions
            .drain(..)
            .filter(|sub| !sub.is_closed() && sub.unsubscribe())
            .count();
        tracing::debug!(released, "Disposed subscriptions");
        released
    }

    /// Number of registered subscriptions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    /// Whether no subscriptions are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }
}

impl Extend<Subscription> for SubscriptionContainer {
    fn extend<I: IntoIterator<Item = Subscription>>(&mut self, iter: I) {
        self.subscriptions.extend(iter);
    }
}

impl Drop for SubscriptionContainer {
    fn drop(&mut self) {
        if !self.subscriptions.is_empty() {
            self.dispose();
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::reactive::{BehaviorSubject, Observable, Subject};

    #[test]
    fn test_dispose_releases_all() {
        let numbers = BehaviorSubject::new(0);
        let words = Subject::<String>::new();
        let hits = Arc::new(AtomicUsize::new(0));

        let mut container = SubscriptionContainer::new();
        let h = Arc::clone(&hits);
        container.add(numbers.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));
        let h = Arc::clone(&hits);
        container.add(words.subscribe(move |_| {
            h.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(container.len(), 2);

        assert_eq!(container.dispose(), 2);
        assert!(container.is_empty());

        numbers.next(1);
        words.next(&"hello".to_string());
        // Only the replayed initial value was delivered
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(numbers.observer_count(), 0);
        assert_eq!(words.observer_count(), 0);
    }

    #[test]
    fn test_dispose_skips_already_closed() {
        let subject = Subject::<u32>::new();
        let mut container = SubscriptionContainer::new();

        let early = subject.subscribe(|_| {});
        early.unsubscribe();
        container.add(early);
        container.add(subject.subscribe(|_| {}));

        assert_eq!(container.dispose(), 1);
        assert_eq!(container.dispose(), 0);
    }

    #[test]
    fn test_drop_disposes() {
        let subject = Subject::<u32>::new();
        {
            let mut container = SubscriptionContainer::new();
            container.extend([subject.subscribe(|_| {}), subject.subscribe(|_| {})]);
            assert_eq!(subject.observer_count(), 2);
        }
        assert_eq!(subject.observer_count(), 0);
    }
}
