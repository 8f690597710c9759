//! Category announcements between views.

use crate::reactive::{Observable, Observer, Subject, Subscription};

/// Side channel on which one view announces the category it switched to.
///
/// Subscribers only see announcements made after they subscribed.
#[derive(Clone, Default)]
pub struct CategoryFilter {
    subject: Subject<String>,
}

impl CategoryFilter {
    /// Create a filter channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Announce `category` to current subscribers.
    pub fn set(&self, category: impl Into<String>) {
        let category = category.into();
        tracing::debug!(category = %category, "Category filter changed");
        self.subject.next(&category);
    }
}

impl Observable for CategoryFilter {
    type Item = String;

    fn subscribe_with(&self, observer: Observer<String>) -> Subscription {
        self.subject.subscribe_with(observer)
    }
}

impl std::fmt::Debug for CategoryFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CategoryFilter")
            .field("subscribers", &self.subject.observer_count())
            .finish()
    }
}
