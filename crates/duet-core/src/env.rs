//! Environment abstraction for deterministic testing.
//!
//! Decouples the session from the system clock. Retry delays go through
//! [`Environment::sleep`] so tests can observe them and run under virtual
//! time; production uses the Tokio timer.

use std::{future::Future, ops::Sub, time::Duration};

/// Abstract environment providing time and sleeping.
///
/// # Invariants
///
/// - `now()` never goes backwards
/// - `sleep()` suspends only the calling task
pub trait Environment: Clone + Send + Sync + 'static {
    /// Instant type used by this environment.
    ///
    /// Production uses `std::time::Instant`; tests use
    /// `tokio::time::Instant` so paused time is observable.
    type Instant: Copy + Ord + Send + Sync + Sub<Output = Duration>;

    /// Current time (monotonic).
    fn now(&self) -> Self::Instant;

    /// Sleeps for the specified duration.
    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}
