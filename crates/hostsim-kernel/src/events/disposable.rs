//! Idempotent teardown handles.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Mutex, PoisonError};

/// A handle whose `dispose()` releases an associated resource exactly once.
///
/// Disposal is idempotent: the teardown callback runs on the first call and
/// later calls are no-ops. A panicking teardown is caught and logged so that
/// composite disposal always completes. There is no `Drop` integration —
/// explicit `dispose()` is the sole teardown contract.
pub struct Disposable {
    teardown: Mutex<Option<Box<dyn FnOnce() + Send>>>,
}

impl Disposable {
    /// Create a disposable wrapping a teardown callback.
    pub fn new(teardown: impl FnOnce() + Send + 'static) -> Self {
        Self {
            teardown: Mutex::new(Some(Box::new(teardown))),
        }
    }

    /// A disposable that does nothing — already inert.
    pub fn noop() -> Self {
        Self {
            teardown: Mutex::new(None),
        }
    }

    /// Combine several disposables into one that disposes them all.
    pub fn from_iter(children: impl IntoIterator<Item = Disposable>) -> Disposable {
        let children: Vec<Disposable> = children.into_iter().collect();
        Disposable::new(move || {
            for child in &children {
                child.dispose();
            }
        })
    }

    /// Run the teardown if it has not run yet.
    pub fn dispose(&self) {
        let teardown = {
            let mut slot = self
                .teardown
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            slot.take()
        };
        if let Some(teardown) = teardown {
            if catch_unwind(AssertUnwindSafe(teardown)).is_err() {
                tracing::warn!("disposable teardown panicked");
            }
        }
    }

    /// True once `dispose()` has been called (or for `noop()`).
    pub fn is_disposed(&self) -> bool {
        self.teardown
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_none()
    }
}

impl std::fmt::Debug for Disposable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Disposable")
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn teardown_runs_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let disposable = Disposable::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        disposable.dispose();
        disposable.dispose();
        disposable.dispose();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn noop_is_already_disposed() {
        let disposable = Disposable::noop();
        assert!(disposable.is_disposed());
        disposable.dispose();
    }

    #[test]
    fn from_iter_disposes_every_child() {
        let calls = Arc::new(AtomicUsize::new(0));
        let children: Vec<Disposable> = (0..3)
            .map(|_| {
                let counter = calls.clone();
                Disposable::new(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        let combined = Disposable::from_iter(children);
        combined.dispose();
        combined.dispose();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn panicking_teardown_is_swallowed() {
        let disposable = Disposable::new(|| panic!("teardown failure"));
        disposable.dispose();
        assert!(disposable.is_disposed());
    }

    #[test]
    fn from_iter_survives_a_panicking_child() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let combined = Disposable::from_iter([
            Disposable::new(|| panic!("first child fails")),
            Disposable::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            }),
        ]);

        combined.dispose();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
