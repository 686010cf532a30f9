//! Event substrate — emitters, disposables, cancellation.
//!
//! Delivery is synchronous and in registration order. Listener and teardown
//! panics are caught and logged, never propagated: one failing subscriber
//! must not starve the rest, and `dispose()` must always complete.

mod cancellation;
mod disposable;
mod emitter;

pub use cancellation::{CancellationSource, CancellationToken};
pub use disposable::Disposable;
pub use emitter::EventEmitter;
