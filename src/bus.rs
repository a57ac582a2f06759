//! Invalidation message bus.
//!
//! Any thread may learn that cached content became stale (a bitmap was
//! edited, a glyph atlas regenerated) while only the render thread may
//! touch the cache. The bus bridges the two: producers post
//! [`UniqueKeyInvalidatedMessage`]s through cloneable senders, and the
//! render thread drains the queue and feeds the batch to
//! [`ResourceCache::process_invalid_unique_keys`](crate::cache::ResourceCache::process_invalid_unique_keys).
//!
//! Delivery is one-way and best-effort:
//!
//! - Senders hold only a weak reference; a sender outliving the bus posts
//!   into nothing and reports the message dropped.
//! - The queue is bounded; posting to a full queue fails rather than
//!   growing without limit.
//! - A message naming a key that no longer resolves is ignored by the
//!   cache when the batch is processed.
//!
//! ## Example Usage
//!
//! ```
//! use gpucache::bus::{InvalidationBus, UniqueKeyInvalidatedMessage};
//! use gpucache::key::{Domain, UniqueKey};
//!
//! let bus = InvalidationBus::new(64);
//! let sender = bus.sender();
//!
//! let domain = Domain::generate();
//! assert!(sender.post(UniqueKeyInvalidatedMessage::new(UniqueKey::new(domain, &[1]))));
//!
//! let drained = bus.drain();
//! assert_eq!(drained.len(), 1);
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

use crate::key::UniqueKey;

/// Notice that the content identified by a [`UniqueKey`] is stale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniqueKeyInvalidatedMessage {
    key: UniqueKey,
}

impl UniqueKeyInvalidatedMessage {
    /// Wraps `key` in an invalidation message.
    pub fn new(key: UniqueKey) -> Self {
        Self { key }
    }

    /// Returns the invalidated key.
    pub fn key(&self) -> &UniqueKey {
        &self.key
    }
}

#[derive(Debug)]
struct BusInner {
    queue: Mutex<VecDeque<UniqueKeyInvalidatedMessage>>,
    capacity: usize,
}

/// Receiving end of the invalidation queue. Owned by the render thread.
#[derive(Debug)]
pub struct InvalidationBus {
    inner: Arc<BusInner>,
}

impl InvalidationBus {
    /// Creates a bus holding at most `capacity` undelivered messages.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Arc::new(BusInner {
                queue: Mutex::new(VecDeque::new()),
                capacity,
            }),
        }
    }

    /// Creates a sender that may be moved to and cloned on other threads.
    pub fn sender(&self) -> InvalidationSender {
        InvalidationSender {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Takes every queued message, oldest first.
    pub fn drain(&self) -> Vec<UniqueKeyInvalidatedMessage> {
        let mut queue = self.inner.queue.lock();
        queue.drain(..).collect()
    }

    /// Returns the number of undelivered messages.
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().len()
    }
}

/// Sending end of the invalidation queue.
///
/// Holds only a weak reference to the bus, so producers that outlive the
/// render thread do not keep the queue alive.
#[derive(Debug, Clone)]
pub struct InvalidationSender {
    inner: Weak<BusInner>,
}

impl InvalidationSender {
    /// Posts `message`, returning `true` if it was enqueued.
    ///
    /// Returns `false` when the bus is gone or the queue is full; either
    /// way the message is dropped.
    pub fn post(&self, message: UniqueKeyInvalidatedMessage) -> bool {
        let Some(inner) = self.inner.upgrade() else {
            return false;
        };
        let mut queue = inner.queue.lock();
        if queue.len() >= inner.capacity {
            return false;
        }
        queue.push_back(message);
        true
    }
}
