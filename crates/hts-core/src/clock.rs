//! Time sources for receive timestamps.
//!
//! Receivers stamp every line at the moment its bytes are read. Stamps come
//! from a [`Clock`] so tests can substitute a deterministic source.

use std::{
    sync::OnceLock,
    time::{Instant, SystemTime, UNIX_EPOCH},
};

/// Source of receive timestamps.
pub trait Clock: Send + Sync + 'static {
    /// Monotonic nanoseconds since an arbitrary, process-wide origin.
    ///
    /// Never decreases between calls.
    fn monotonic_ns(&self) -> u64;

    /// Wall-clock nanoseconds since the Unix epoch, if the system clock is
    /// set after it.
    fn unix_time_ns(&self) -> Option<u64>;
}

/// Operating system clocks.
///
/// All instances share one monotonic origin, so stamps taken by different
/// receivers in the same process are comparable.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

fn origin() -> Instant {
    static ORIGIN: OnceLock<Instant> = OnceLock::new();
    *ORIGIN.get_or_init(Instant::now)
}

impl Clock for SystemClock {
    fn monotonic_ns(&self) -> u64 {
        u64::try_from(origin().elapsed().as_nanos()).unwrap_or(u64::MAX)
    }

    fn unix_time_ns(&self) -> Option<u64> {
        let since_epoch = SystemTime::now().duration_since(UNIX_EPOCH).ok()?;
        u64::try_from(since_epoch.as_nanos()).ok()
    }
}
