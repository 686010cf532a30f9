//! Synchronous typed event emitters.

use super::disposable::Disposable;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Listener<T> = Arc<dyn Fn(&T) + Send + Sync>;

struct Shared<T> {
    /// Listener arena: slot index is the subscription token. Slots are
    /// cleared on unsubscribe, never compacted, so indices stay stable and
    /// iteration order is registration order.
    slots: Mutex<Vec<Option<Listener<T>>>>,
    disposed: AtomicBool,
}

impl<T> Shared<T> {
    fn lock_slots(&self) -> std::sync::MutexGuard<'_, Vec<Option<Listener<T>>>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A synchronous pub/sub channel for values of type `T`.
///
/// `fire` invokes every live listener in registration order before it
/// returns. A panicking listener is isolated: the panic is caught and
/// logged, and delivery continues with the remaining listeners.
pub struct EventEmitter<T> {
    shared: Arc<Shared<T>>,
}

impl<T> EventEmitter<T> {
    /// Create a new emitter with no listeners.
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                slots: Mutex::new(Vec::new()),
                disposed: AtomicBool::new(false),
            }),
        }
    }

    /// Register a listener. The returned disposable removes exactly this
    /// registration.
    ///
    /// Subscribing to a disposed emitter is not an error — an already-inert
    /// disposable is returned and the listener will never fire.
    pub fn subscribe(&self, listener: impl Fn(&T) + Send + Sync + 'static) -> Disposable
    where
        T: 'static,
    {
        if self.shared.disposed.load(Ordering::SeqCst) {
            return Disposable::noop();
        }

        let index = {
            let mut slots = self.shared.lock_slots();
            slots.push(Some(Arc::new(listener)));
            slots.len() - 1
        };

        // Weak so an outstanding subscription does not keep the arena alive.
        let shared = Arc::downgrade(&self.shared);
        Disposable::new(move || {
            if let Some(shared) = Weak::upgrade(&shared) {
                let mut slots = shared.lock_slots();
                if let Some(slot) = slots.get_mut(index) {
                    *slot = None;
                }
            }
        })
    }

    /// Deliver `value` to every live listener, synchronously, in
    /// registration order. No-op after `dispose()`.
    pub fn fire(&self, value: &T) {
        if self.shared.disposed.load(Ordering::SeqCst) {
            return;
        }

        // Snapshot the live listeners and release the lock before invoking,
        // so listeners may subscribe or dispose re-entrantly.
        let live: Vec<(usize, Listener<T>)> = {
            let slots = self.shared.lock_slots();
            slots
                .iter()
                .enumerate()
                .filter_map(|(index, slot)| slot.clone().map(|l| (index, l)))
                .collect()
        };

        for (index, listener) in live {
            if catch_unwind(AssertUnwindSafe(|| listener(value))).is_err() {
                tracing::error!(listener = index, "event listener panicked; continuing delivery");
            }
        }
    }

    /// Drop all listeners and make later `fire` calls no-ops.
    ///
    /// The emitter stays safely subscribable afterwards; new subscriptions
    /// are inert.
    pub fn dispose(&self) {
        self.shared.disposed.store(true, Ordering::SeqCst);
        self.shared.lock_slots().clear();
    }

    /// Number of live listeners.
    pub fn listener_count(&self) -> usize {
        self.shared
            .lock_slots()
            .iter()
            .filter(|slot| slot.is_some())
            .count()
    }
}

impl<T> Default for EventEmitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EventEmitter<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventEmitter")
            .field("listeners", &self.listener_count())
            .field("disposed", &self.shared.disposed.load(Ordering::SeqCst))
            .finish()
    }
}
