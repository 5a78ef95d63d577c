//! Manually advanced clock.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use hts_core::Clock;

/// Unix time reported at monotonic zero: 2024-01-01T00:00:00Z.
pub const DEFAULT_UNIX_EPOCH_NS: u64 = 1_704_067_200_000_000_000;

/// Clock that only moves when told to.
///
/// Clones share the same time. Wall-clock readings are the monotonic reading
/// plus a fixed offset, so both advance together.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now_ns: Arc<AtomicU64>,
    unix_offset_ns: Option<u64>,
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualClock {
    /// Clock at monotonic zero with the default wall-clock offset.
    pub fn new() -> Self {
        Self { now_ns: Arc::new(AtomicU64::new(0)), unix_offset_ns: Some(DEFAULT_UNIX_EPOCH_NS) }
    }

    /// Clock that reports no wall-clock time.
    pub fn without_wall_time() -> Self {
        Self { unix_offset_ns: None, ..Self::new() }
    }

    /// Advance by `by`, returning the new reading.
    pub fn advance(&self, by: Duration) -> u64 {
        let by = u64::try_from(by.as_nanos()).unwrap_or(u64::MAX);
        self.advance_ns(by)
    }

    /// Advance by `ns` nanoseconds, returning the new reading.
    pub fn advance_ns(&self, ns: u64) -> u64 {
        self.now_ns.fetch_add(ns, Ordering::SeqCst).saturating_add(ns)
    }

    /// Set the monotonic reading.
    pub fn set_ns(&self, ns: u64) {
        self.now_ns.store(ns, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn monotonic_ns(&self) -> u64 {
        self.now_ns.load(Ordering::SeqCst)
    }

    fn unix_time_ns(&self) -> Option<u64> {
        self.unix_offset_ns.map(|offset| offset.saturating_add(self.monotonic_ns()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_time() {
        let clock = ManualClock::new();
        let other = clock.clone();

        assert_eq!(clock.advance(Duration::from_millis(2)), 2_000_000);
        assert_eq!(other.monotonic_ns(), 2_000_000);
        assert_eq!(other.unix_time_ns(), Some(DEFAULT_UNIX_EPOCH_NS + 2_000_000));
    }

    #[test]
    fn wall_time_can_be_disabled() {
        let clock = ManualClock::without_wall_time();
        clock.set_ns(10);
        assert_eq!(clock.monotonic_ns(), 10);
        assert_eq!(clock.unix_time_ns(), None);
    }
}
