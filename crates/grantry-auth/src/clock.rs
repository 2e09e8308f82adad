//! Time sources.
//!
//! Everything that stamps or expires a credential reads the current instant
//! through a [`Clock`], so expiry can be driven deterministically in tests.

use std::sync::{Arc, Mutex, PoisonError};

use time::{Duration, OffsetDateTime};

/// Source of the current instant.
pub trait Clock: Send + Sync {
    /// Returns the current UTC instant.
    fn now(&self) -> OffsetDateTime;
}

/// Shared clock handle.
pub type DynClock = Arc<dyn Clock>;

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Returns a shareable system clock.
    #[must_use]
    pub fn shared() -> DynClock {
        Arc::new(Self)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> OffsetDateTime {
        OffsetDateTime::now_utc()
    }
}

/// Manually driven clock for tests and simulations.
///
/// Clones share the same instant, so a test can hand one clone to the store
/// and advance another.
#[derive(Debug, Clone)]
pub struct ManualClock {
    current: Arc<Mutex<OffsetDateTime>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    #[must_use]
    pub fn new(start: OffsetDateTime) -> Self {
        Self {
            current: Arc::new(Mutex::new(start)),
        }
    }

    /// Moves the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        *current += by;
    }

    /// Sets the clock to an absolute instant.
    pub fn set(&self, instant: OffsetDateTime) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = instant;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> OffsetDateTime {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
