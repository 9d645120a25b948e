//! Retry backoff for the produce delivery loop.
//!
//! The delivery loop is single-threaded and cooperative (see
//! [`crate::producer`]), so a blocking [`std::thread::sleep`] between
//! attempts is acceptable rather than a concern to be hidden behind a
//! cancellable timer.

use std::time::Duration;

/// A fixed delay applied between produce attempts.
///
/// Unlike exponential backoff schemes, the wire protocol this client targets
/// exposes `retry_backoff` as a single configured duration, not a curve, so
/// this stays a thin wrapper rather than a stateful policy object.
#[derive(Debug, Clone, Copy)]
pub struct Backoff {
    delay: Duration,
}

impl Backoff {
    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Blocks the current thread for the configured delay.
    pub fn sleep(&self) {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100))
    }
}
