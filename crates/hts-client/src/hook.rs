//! Typed observer events.
//!
//! A [`LogHook`] sees every significant occurrence in the client as a
//! [`StreamLogEvent`]. Hooks run inline on the receive path. A hook that
//! returns an error or panics is counted in
//! [`crate::ClientStats::callback_errors`] and otherwise ignored; it never
//! disturbs the stream.

use std::{
    fmt,
    panic::{self, AssertUnwindSafe},
};

use hts_proto::HandSide;

use crate::stats::ClientStats;

/// Error returned by observer hooks and event callbacks.
pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogEventKind {
    /// The receiver delivered a line
    ReceivedLine,
    /// A line failed to decode
    ParseError,
    /// A packet was removed by the hand filter
    FilteredPacket,
    /// A packet was yielded
    EmittedPacket,
    /// A frame was yielded
    EmittedFrame,
    /// No line arrived within the timeout
    Timeout,
    /// The peer disconnected
    Disconnected,
    /// The receiver closed and the stream ended
    Closed,
    /// The event callback passed to `run` failed
    CallbackError,
}

impl LogEventKind {
    /// Stable snake_case name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReceivedLine => "received_line",
            Self::ParseError => "parse_error",
            Self::FilteredPacket => "filtered_packet",
            Self::EmittedPacket => "emitted_packet",
            Self::EmittedFrame => "emitted_frame",
            Self::Timeout => "timeout",
            Self::Disconnected => "disconnected",
            Self::Closed => "closed",
            Self::CallbackError => "callback_error",
        }
    }
}

impl fmt::Display for LogEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One observer event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamLogEvent {
    /// What happened
    pub kind: LogEventKind,
    /// Human-readable summary
    pub message: String,
    /// Hand side involved, if any
    pub side: Option<HandSide>,
    /// Raw line involved, if any
    pub line: Option<String>,
    /// Error text, if any
    pub error: Option<String>,
}

impl StreamLogEvent {
    /// Event with only a kind and message.
    pub fn new(kind: LogEventKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into(), side: None, line: None, error: None }
    }

    /// Attach a hand side.
    #[must_use]
    pub fn with_side(mut self, side: HandSide) -> Self {
        self.side = Some(side);
        self
    }

    /// Attach the raw line.
    #[must_use]
    pub fn with_line(mut self, line: impl Into<String>) -> Self {
        self.line = Some(line.into());
        self
    }

    /// Attach error text.
    #[must_use]
    pub fn with_error(mut self, error: impl fmt::Display) -> Self {
        self.error = Some(error.to_string());
        self
    }
}

/// Observer for client events.
pub trait LogHook: Send + Sync {
    /// Handle one event.
    ///
    /// # Errors
    ///
    /// Any error is counted and swallowed by the client.
    fn on_event(&self, event: &StreamLogEvent) -> Result<(), HookError>;
}

impl<F> LogHook for F
where
    F: Fn(&StreamLogEvent) -> Result<(), HookError> + Send + Sync,
{
    fn on_event(&self, event: &StreamLogEvent) -> Result<(), HookError> {
        self(event)
    }
}

/// Invoke `hook` with the event built by `build`, isolating failures.
///
/// The event is only built when a hook is installed.
pub(crate) fn dispatch(
    hook: Option<&dyn LogHook>,
    stats: &mut ClientStats,
    build: impl FnOnce() -> StreamLogEvent,
) {
    let Some(hook) = hook else {
        return;
    };

    let event = build();
    stats.callbacks_invoked += 1;

    match panic::catch_unwind(AssertUnwindSafe(|| hook.on_event(&event))) {
        Ok(Ok(())) => {},
        Ok(Err(error)) => {
            stats.callback_errors += 1;
            tracing::warn!(kind = %event.kind, %error, "log hook failed");
        },
        Err(_) => {
            stats.callback_errors += 1;
            tracing::warn!(kind = %event.kind, "log hook panicked");
        },
    }
}
