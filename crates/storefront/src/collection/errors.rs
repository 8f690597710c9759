//! Persistence failures and the channel they are reported on.

use thiserror::Error;

use crate::reactive::{Observable, Observer, Subject, Subscription};
use crate::storage::StorageError;

/// A failure to load or save a collection.
#[derive(Debug, Error)]
pub enum PersistError {
    /// The stored value could not be read.
    #[error("failed to read `{key}` from storage: {source}")]
    Read {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The new value could not be written.
    #[error("failed to write `{key}` to storage: {source}")]
    Write {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The stored value is not a JSON array of products.
    #[error("malformed data under `{key}`: {source}")]
    Malformed {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    /// The collection could not be encoded.
    #[error("failed to encode `{key}`: {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

impl PersistError {
    /// Storage key the failure concerns.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Read { key, .. }
            | Self::Write { key, .. }
            | Self::Malformed { key, .. }
            | Self::Encode { key, .. } => key,
        }
    }

    /// Whether the failure happened while loading, as opposed to saving.
    #[must_use]
    pub const fn is_load_failure(&self) -> bool {
        matches!(self, Self::Read { .. } | Self::Malformed { .. })
    }
}

/// Where collections report persistence failures.
///
/// Every report is logged at `error` level and then pushed to subscribers.
/// Reports made before anyone subscribed are only logged. Clones share the
/// same subscribers, so one channel can serve the cart and the wishlist.
#[derive(Clone, Default)]
pub struct ErrorChannel {
    subject: Subject<PersistError>,
}

impl ErrorChannel {
    /// Create a channel with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Log `error` and push it to every subscriber.
    pub fn report(&self, error: PersistError) {
        tracing::error!(key = %error.key(), error = %error, "Collection persistence failed");
        self.subject.next(&error);
    }
}

impl Observable for ErrorChannel {
    type Item = PersistError;

    fn subscribe_with(&self, observer: Observer<PersistError>) -> Subscription {
        self.subject.subscribe_with(observer)
    }
}

impl std::fmt::Debug for ErrorChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("subscribers", &self.subject.observer_count())
            .finish()
    }
}
