//! Push-based observable state.
//!
//! # Architecture
//!
//! - [`BehaviorSubject`] holds a current value and replays it to every new
//!   subscriber, then pushes each replacement value
//! - [`Subject`] pushes values to the subscribers present at emission time,
//!   with no replay
//! - [`Observable::map`] derives a new stream from an existing one (cart
//!   count and total are derived from the item stream this way)
//! - [`Subscription`] is the handle returned by every `subscribe` call
//!
//! Delivery is synchronous: `next` returns only after every subscriber has
//! run, unless a delivery is already under way. Subscribers are invoked
//! outside the internal locks, so a subscriber may read from or write to the
//! subject that is notifying it; such a write, or one from another thread
//! during delivery, is queued and handed out by the delivery in progress, in
//! commit order.
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use cornershop_storefront::reactive::{BehaviorSubject, Observable};
//!
//! let subject = BehaviorSubject::new(vec![1, 2]);
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let sink = Arc::clone(&seen);
//! let sub = subject
//!     .as_stream()
//!     .map(Vec::len)
//!     .subscribe(move |len| sink.lock().unwrap().push(*len));
//!
//! subject.next(vec![1, 2, 3]);
//! sub.unsubscribe();
//! subject.next(vec![]);
//!
//! assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
//! ```

mod subject;
mod subscription;

pub use subject::{BehaviorSubject, Subject, ValueStream};
pub use subscription::Subscription;

use std::sync::Arc;

/// A subscriber callback.
pub type Observer<T> = Arc<dyn Fn(&T) + Send + Sync>;

/// A source of values that can be subscribed to.
pub trait Observable: Send + Sync {
    /// Type of the emitted values.
    type Item;

    /// Register a type-erased observer.
    fn subscribe_with(&self, observer: Observer<Self::Item>) -> Subscription;

    /// Register a closure to receive values.
    #[must_use = "dropping the handle keeps the subscription alive; keep it to unsubscribe"]
    fn subscribe<F>(&self, f: F) -> Subscription
    where
        Self: Sized,
        F: Fn(&Self::Item) + Send + Sync + 'static,
    {
        self.subscribe_with(Arc::new(f))
    }

    /// Derive a stream that applies `f` to every value of this one.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        Self: Sized,
        F: Fn(&Self::Item) -> U + Send + Sync + 'static,
    {
        Map {
            source: self,
            f: Arc::new(f),
        }
    }
}

/// Stream returned by [`Observable::map`].
pub struct Map<S, F> {
    source: S,
    f: Arc<F>,
}

impl<S, F, U> Observable for Map<S, F>
where
    S: Observable,
    S::Item: 'static,
    F: Fn(&S::Item) -> U + Send + Sync + 'static,
    U: 'static,
{
    type Item = U;

    fn subscribe_with(&self, observer: Observer<U>) -> Subscription {
        let f = Arc::clone(&self.f);
        self.source
            .subscribe_with(Arc::new(move |value: &S::Item| observer(&f(value))))
    }
}

impl<S: Clone, F> Clone for Map<S, F> {
    fn clone(&self) -> Self {
        Self {
            source: self.source.clone(),
            f: Arc::clone(&self.f),
        }
    }
}
