//! Client counters.

/// Counters kept by a [`crate::Client`].
///
/// Every received line lands in exactly one bucket: filtered, passed to the
/// assembler, dropped under the tolerant policy, or raised under the strict
/// policy. So `lines_received == packets_filtered + passed + parse_errors`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClientStats {
    /// Lines delivered by the receiver
    pub lines_received: u64,
    /// Lines that failed to decode
    pub parse_errors: u64,
    /// Undecodable lines skipped under the tolerant policy
    pub dropped_lines: u64,
    /// Packets removed by the hand filter
    pub packets_filtered: u64,
    /// Packets yielded
    pub packets_emitted: u64,
    /// Frames yielded
    pub frames_emitted: u64,
    /// Log hook invocations, plus `run` callbacks that returned `Ok`
    pub callbacks_invoked: u64,
    /// Log hook failures and panics, plus failed `run` callbacks
    pub callback_errors: u64,
}

impl ClientStats {
    /// Lines that decoded and passed the filter.
    pub const fn packets_accepted(&self) -> u64 {
        self.lines_received - self.parse_errors - self.packets_filtered
    }
}
