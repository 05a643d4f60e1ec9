//! Cooperative generation-counter cancellation.
//!
//! The bus delivers every message to every live listener; it has no
//! cancellation primitive. Callers that run long on behalf of a request
//! layer cancellation on top: a shared [`GenerationClock`] is bumped on
//! every "stop"-class broadcast, and a long-running handler captures a
//! [`Generation`] when it starts and checks [`Generation::is_current`]
//! before each side effect, abandoning work done on behalf of a superseded
//! call.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic counter of "stop" events.
#[derive(Debug, Clone, Default)]
pub struct GenerationClock {
    counter: Arc<AtomicU64>,
}

impl GenerationClock {
    /// Creates a clock at generation zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the clock, invalidating every outstanding [`Generation`].
    ///
    /// Returns the new generation number.
    pub fn bump(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Captures the current generation.
    pub fn current(&self) -> Generation {
        Generation {
            seen: self.counter.load(Ordering::SeqCst),
            counter: Arc::clone(&self.counter),
        }
    }
}

/// A snapshot of the clock, held by one long-running caller.
#[derive(Debug, Clone)]
pub struct Generation {
    seen: u64,
    counter: Arc<AtomicU64>,
}

impl Generation {
    /// Returns true if no "stop" event has occurred since this generation
    /// was captured.
    pub fn is_current(&self) -> bool {
        self.counter.load(Ordering::SeqCst) == self.seen
    }
}
