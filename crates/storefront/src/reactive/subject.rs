//! Subjects: observables that can be pushed to.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, Weak};

use super::subscription::{Detach, Subscription};
use super::{Observable, Observer};

/// Observer registry shared by both subject kinds.
///
/// Observers are keyed by a monotonically increasing id, so iteration order
/// is registration order.
struct Registry<T> {
    next_id: AtomicU64,
    observers: RwLock<BTreeMap<u64, Observer<T>>>,
}

impl<T> Registry<T> {
    fn new() -> Self {
        Self {
            next_id: AtomicU64::new(0),
            observers: RwLock::new(BTreeMap::new()),
        }
    }

    fn add(&self, observer: Observer<T>) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, observer);
        id
    }

    /// Observers registered right now. Emission iterates this copy so that
    /// observers can subscribe or unsubscribe while being notified.
    fn snapshot(&self) -> Vec<Observer<T>> {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    fn emit(&self, value: &T) {
        for observer in self.snapshot() {
            observer(value);
        }
    }

    fn contains(&self, id: u64) -> bool {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&id)
    }

    fn len(&self) -> usize {
        self.observers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<T: Send + Sync> Detach for Registry<T> {
    fn detach(&self, id: u64) {
        self.observers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }
}

fn subscription_for<T: Send + Sync + 'static>(registry: &Arc<Registry<T>>, id: u64) -> Subscription {
    let source: Arc<dyn Detach> = Arc::clone(registry) as Arc<dyn Detach>;
    let weak: Weak<dyn Detach> = Arc::downgrade(&source);
    Subscription::new(id, weak)
}

// =============================================================================
// Subject
// =============================================================================

/// A multicast stream without replay.
///
/// Subscribers receive only the values pushed after they subscribed.
pub struct Subject<T> {
    registry: Arc<Registry<T>>,
}

impl<T> Clone for Subject<T> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
        }
    }
}

impl<T> Default for Subject<T> {
    fn default() -> Self {
        Self {
            registry: Arc::new(Registry::new()),
        }
    }
}

impl<T> Subject<T> {
    /// Create a subject with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a value to every current subscriber.
    pub fn next(&self, value: &T) {
        self.registry.emit(value);
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.registry.len()
    }
}

impl<T: Send + Sync + 'static> Observable for Subject<T> {
    type Item = T;

    fn subscribe_with(&self, observer: Observer<T>) -> Subscription {
        let id = self.registry.add(observer);
        subscription_for(&self.registry, id)
    }
}

// =============================================================================
// BehaviorSubject
// =============================================================================

/// A committed value and its position in commit order.
struct Versioned<T> {
    version: u64,
    value: T,
}

/// Pending delivery work, run in the order it was queued.
enum Job<T> {
    /// Push a committed value to every observer.
    Emit(Versioned<T>),
    /// Give a new observer the value that was current when it subscribed.
    Replay {
        id: u64,
        observer: Observer<T>,
        value: T,
    },
}

struct Outbox<T> {
    jobs: VecDeque<Job<T>>,
    draining: bool,
}

struct BehaviorInner<T> {
    state: RwLock<Versioned<T>>,
    registry: Arc<Registry<Versioned<T>>>,
    outbox: Mutex<Outbox<T>>,
}

/// Clears the draining flag if an observer panics mid-delivery.
struct DrainGuard<'a, T> {
    outbox: &'a Mutex<Outbox<T>>,
    finished: bool,
}

impl<T> Drop for DrainGuard<'_, T> {
    fn drop(&mut self) {
        if !self.finished {
            self.outbox
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .draining = false;
        }
    }
}

impl<T: Clone + Send + Sync + 'static> BehaviorInner<T> {
    fn enqueue(&self, job: Job<T>) {
        self.outbox
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .jobs
            .push_back(job);
    }

    /// Store `value` as the next version and queue it for delivery.
    ///
    /// Must be called with the state write-locked, so the queue order is the
    /// commit order.
    fn commit(&self, state: &mut Versioned<T>, value: T) {
        state.version += 1;
        state.value = value.clone();
        self.enqueue(Job::Emit(Versioned {
            version: state.version,
            value,
        }));
    }

    /// Run queued jobs until the queue is empty.
    ///
    /// Only one caller drains at a time. A commit made while another caller
    /// is draining (from an observer, or from another thread) is delivered
    /// by that caller, after the jobs queued before it.
    fn drain(&self) {
        {
            let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
            if outbox.draining {
                return;
            }
            outbox.draining = true;
        }
        let mut guard = DrainGuard {
            outbox: &self.outbox,
            finished: false,
        };

        loop {
            let job = {
                let mut outbox = self.outbox.lock().unwrap_or_else(PoisonError::into_inner);
                let job = outbox.jobs.pop_front();
                // Stop under the same lock that saw the queue empty, so a job
                // queued right after is drained by its own caller
                if job.is_none() {
                    outbox.draining = false;
                }
                job
            };
            match job {
                Some(Job::Emit(versioned)) => self.registry.emit(&versioned),
                Some(Job::Replay { id, observer, value }) => {
                    if self.registry.contains(id) {
                        observer(&value);
                    }
                }
                None => break,
            }
        }
        guard.finished = true;
    }
}

/// A stream that always has a current value.
///
/// New subscribers receive the current value on registration, then every
/// value committed after it. Values reach every subscriber in commit order,
/// so the last value a subscriber has seen is always the current one once
/// delivery settles.
///
/// Delivery is synchronous for the caller that starts it. A value committed
/// while a delivery is already running, whether from inside an observer or
/// from another thread, is queued and delivered by the running delivery
/// once the values before it have gone out.
pub struct BehaviorSubject<T> {
    inner: Arc<BehaviorInner<T>>,
}

impl<T> Clone for BehaviorSubject<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> BehaviorSubject<T> {
    /// Create a subject holding `initial`.
    #[must_use]
    pub fn new(initial: T) -> Self {
        Self {
            inner: Arc::new(BehaviorInner {
                state: RwLock::new(Versioned {
                    version: 0,
                    value: initial,
                }),
                registry: Arc::new(Registry::new()),
                outbox: Mutex::new(Outbox {
                    jobs: VecDeque::new(),
                    draining: false,
                }),
            }),
        }
    }

    /// A clone of the current value.
    #[must_use]
    pub fn value(&self) -> T {
        self.with_value(T::clone)
    }

    /// Run `f` against the current value without cloning it.
    pub fn with_value<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let state = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&state.value)
    }

    /// Replace the current value and push it to every subscriber.
    pub fn next(&self, value: T) {
        {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            self.inner.commit(&mut state, value);
        }
        self.inner.drain();
    }

    /// Compute a replacement from the current value and, if `f` succeeds,
    /// commit it and push it to every subscriber.
    ///
    /// `f` runs while the value is write-locked, so concurrent updates are
    /// serialized. Subscribers are notified after the lock is released. If
    /// `f` fails, the current value is kept and nothing is pushed.
    ///
    /// # Errors
    ///
    /// Returns the error produced by `f`.
    pub fn try_update<E>(&self, f: impl FnOnce(&T) -> Result<T, E>) -> Result<(), E> {
        {
            let mut state = self
                .inner
                .state
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            let candidate = f(&state.value)?;
            self.inner.commit(&mut state, candidate);
        }
        self.inner.drain();
        Ok(())
    }

    /// A read-only view of this subject.
    #[must_use]
    pub fn as_stream(&self) -> ValueStream<T> {
        ValueStream {
            subject: self.clone(),
        }
    }

    /// Number of active subscribers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.inner.registry.len()
    }
}

impl<T: Clone + Send + Sync + 'static> Observable for BehaviorSubject<T> {
    type Item = T;

    fn subscribe_with(&self, observer: Observer<T>) -> Subscription {
        let id = {
            // Holding the read lock keeps commits out until the replay is
            // queued, so the replay lands before every newer version
            let state = self
                .inner
                .state
                .read()
                .unwrap_or_else(PoisonError::into_inner);
            let since = state.version;
            let forward = Arc::clone(&observer);
            let id = self.inner.registry.add(Arc::new(move |v: &Versioned<T>| {
                if v.version > since {
                    forward(&v.value);
                }
            }));
            self.inner.enqueue(Job::Replay {
                id,
                observer,
                value: state.value.clone(),
            });
            id
        };
        self.inner.drain();
        subscription_for(&self.inner.registry, id)
    }
}

/// Read-only view of a [`BehaviorSubject`]: can be subscribed to and read,
/// but not pushed to.
pub struct ValueStream<T> {
    subject: BehaviorSubject<T>,
}

impl<T> Clone for ValueStream<T> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> ValueStream<T> {
    /// A clone of the current value.
    #[must_use]
    pub fn value(&self) -> T {
        self.subject.value()
    }
}

impl<T: Clone + Send + Sync + 'static> Observable for ValueStream<T> {
    type Item = T;

    fn subscribe_with(&self, observer: Observer<T>) -> Subscription {
        self.subject.subscribe_with(observer)
    }
}
