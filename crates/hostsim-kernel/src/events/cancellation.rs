//! Cooperative cancellation.

use super::disposable::Disposable;
use super::emitter::EventEmitter;
use hostsim_types::EventError;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

struct CancelState {
    cancelled: AtomicBool,
    emitter: EventEmitter<()>,
}

/// Owner side of a cancellation pair.
///
/// `cancel()` flips the token exactly once; `dispose()` tears down the
/// internal emitter and makes `token()` fail. Cancellation is one-way —
/// there is no un-cancel.
pub struct CancellationSource {
    state: Arc<CancelState>,
    disposed: AtomicBool,
}

impl CancellationSource {
    /// Create a source with an un-cancelled token.
    pub fn new() -> Self {
        Self {
            state: Arc::new(CancelState {
                cancelled: AtomicBool::new(false),
                emitter: EventEmitter::new(),
            }),
            disposed: AtomicBool::new(false),
        }
    }

    /// The read side of this source.
    ///
    /// Fails with `SourceDisposed` once the source has been disposed.
    pub fn token(&self) -> Result<CancellationToken, EventError> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(EventError::SourceDisposed);
        }
        Ok(CancellationToken {
            state: self.state.clone(),
        })
    }

    /// Request cancellation.
    ///
    /// The flag flips and the token's event fires exactly once, no matter
    /// how many times `cancel()` is called.
    pub fn cancel(&self) {
        if !self.state.cancelled.swap(true, Ordering::SeqCst) {
            self.state.emitter.fire(&());
        }
    }

    /// Tear down the internal emitter and invalidate `token()`.
    ///
    /// Tokens already handed out keep reporting the cancellation flag but
    /// will no longer receive events.
    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::SeqCst);
        self.state.emitter.dispose();
    }
}

impl Default for CancellationSource {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CancellationSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationSource")
            .field("cancelled", &self.state.cancelled.load(Ordering::SeqCst))
            .field("disposed", &self.disposed.load(Ordering::SeqCst))
            .finish()
    }
}

/// Read-only cancellation flag plus its change event.
///
/// Cancellation is cooperative: the token signals intent and never aborts
/// an in-flight kernel operation.
#[derive(Clone)]
pub struct CancellationToken {
    state: Arc<CancelState>,
}

impl CancellationToken {
    /// True once the owning source has cancelled.
    pub fn is_cancellation_requested(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Register a listener for the cancellation event.
    ///
    /// If the token is already cancelled the listener runs immediately and
    /// an inert disposable is returned.
    pub fn on_cancellation_requested(
        &self,
        listener: impl Fn() + Send + Sync + 'static,
    ) -> Disposable {
        if self.is_cancellation_requested() {
            if catch_unwind(AssertUnwindSafe(&listener)).is_err() {
                tracing::error!("cancellation listener panicked");
            }
            return Disposable::noop();
        }
        self.state.emitter.subscribe(move |_: &()| listener())
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancellation_requested())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn cancel_flips_the_flag_and_fires_once() {
        let source = CancellationSource::new();
        let token = source.token().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));

        {
            let fired = fired.clone();
            token.on_cancellation_requested(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(!token.is_cancellation_requested());
        source.cancel();
        source.cancel();
        source.cancel();

        assert!(token.is_cancellation_requested());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn late_listener_on_cancelled_token_runs_immediately() {
        let source = CancellationSource::new();
        let token = source.token().unwrap();
        source.cancel();

        let fired = Arc::new(AtomicUsize::new(0));
        let subscription = {
            let fired = fired.clone();
            token.on_cancellation_requested(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            })
        };

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(subscription.is_disposed());
    }

    #[test]
    fn token_fails_after_dispose() {
        let source = CancellationSource::new();
        let early = source.token().unwrap();

        source.dispose();

        assert!(matches!(source.token(), Err(EventError::SourceDisposed)));
        // A token obtained before disposal still reads the flag.
        assert!(!early.is_cancellation_requested());
    }

    #[test]
    fn cancel_after_dispose_sets_flag_without_event() {
        let source = CancellationSource::new();
        let token = source.token().unwrap();
        let fired = Arc::new(AtomicUsize::new(0));
        {
            let fired = fired.clone();
            token.on_cancellation_requested(move || {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        source.dispose();
        source.cancel();

        assert!(token.is_cancellation_requested());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
