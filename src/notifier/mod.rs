//! Subscriber registry for flush outcomes.
//!
//! A [`Notifier`] holds an ordered, de-duplicated list of [`Subscriber`]
//! handles and calls them either on the current task ([`Notifier::notify`])
//! or each on the blocking pool ([`Notifier::notify_async`]).

mod events;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;

pub use events::{FlushFailure, FlushReport};

/// A registered callback.
///
/// Cloning a subscriber clones the handle, not the closure: two clones compare
/// equal, while two subscribers built from identical closures do not. Keep a
/// clone around to unsubscribe later.
pub struct Subscriber<A> {
    callback: Arc<dyn Fn(&A) + Send + Sync>,
}

impl<A> Subscriber<A> {
    /// Wraps a closure into a subscriber handle.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        Self {
            callback: Arc::new(callback),
        }
    }

    /// Invokes the callback.
    pub fn call(&self, args: &A) {
        (self.callback)(args)
    }
}

impl<A> Clone for Subscriber<A> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
        }
    }
}

impl<A> PartialEq for Subscriber<A> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.callback, &other.callback)
    }
}

impl<A> Eq for Subscriber<A> {}

impl<A> std::fmt::Debug for Subscriber<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("callback", &Arc::as_ptr(&self.callback))
            .finish()
    }
}

/// Ordered, de-duplicated list of subscribers for one event stream.
pub struct Notifier<A> {
    subscribers: Mutex<Vec<Subscriber<A>>>,
}

impl<A> Notifier<A> {
    /// Creates a notifier with no subscribers.
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Registers `subscriber` unless the same handle is already registered.
    ///
    /// Returns `true` if the subscriber was added.
    pub fn subscribe(&self, subscriber: Subscriber<A>) -> bool {
        let mut subscribers = self.lock();
        if subscribers.contains(&subscriber) {
            return false;
        }
        subscribers.push(subscriber);
        true
    }

    /// Removes `subscriber`. Returns `false` if it was not registered.
    pub fn unsubscribe(&self, subscriber: &Subscriber<A>) -> bool {
        let mut subscribers = self.lock();
        match subscribers.iter().position(|s| s == subscriber) {
            Some(index) => {
                subscribers.remove(index);
                true
            }
            None => false,
        }
    }

    /// Number of registered subscribers.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether no subscriber is registered.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Calls every subscriber in subscription order on the current task.
    ///
    /// The list is snapshotted first, so callbacks may subscribe or
    /// unsubscribe without deadlocking. A panicking callback is logged and the
    /// remaining subscribers still run.
    pub fn notify(&self, args: &A) {
        for subscriber in self.snapshot() {
            let result = panic::catch_unwind(AssertUnwindSafe(|| subscriber.call(args)));
            if result.is_err() {
                log::error!("Subscriber {:?} panicked during notification", subscriber);
            }
        }
    }

    fn snapshot(&self) -> Vec<Subscriber<A>> {
        self.lock().clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Subscriber<A>>> {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<A> Notifier<A>
where
    A: Send + Sync + 'static,
{
    /// Calls every subscriber on the blocking pool, one task per subscriber.
    ///
    /// Returns immediately with the join handles. A panic inside a callback
    /// only surfaces through that callback's handle.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn notify_async(&self, args: A) -> Vec<JoinHandle<()>> {
        let args = Arc::new(args);
        self.snapshot()
            .into_iter()
            .map(|subscriber| {
                let args = Arc::clone(&args);
                tokio::task::spawn_blocking(move || subscriber.call(&args))
            })
            .collect()
    }
}

impl<A> Default for Notifier<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> std::fmt::Debug for Notifier<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.len())
            .finish()
    }
}
