//! Scripted line receiver.
//!
//! Replays a fixed list of [`Step`]s through the [`LineReceiver`] contract.
//! Each delivered line advances a [`ManualClock`] by a fixed step before it is
//! stamped, so receive timestamps are strictly increasing and predictable.

use std::{collections::VecDeque, io, time::Duration};

use async_trait::async_trait;
use hts_core::{Clock, CloseHandle, LineReceiver, ReceiveMeta, ReceivedLine, TransportError};

use crate::clock::ManualClock;

/// Default clock advance per delivered line.
pub const DEFAULT_LINE_STEP: Duration = Duration::from_millis(1);

/// One scripted receiver outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Deliver a line
    Line(String),
    /// Report a timeout
    Timeout,
    /// Report a peer disconnect with the given reason
    Disconnect(String),
    /// Report an unrecoverable I/O fault of the given kind
    Io(io::ErrorKind),
    /// Close the receiver
    Close,
    /// Wait until closed through a [`CloseHandle`]
    Block,
}

impl From<&str> for Step {
    fn from(line: &str) -> Self {
        Self::Line(line.to_string())
    }
}

impl From<String> for Step {
    fn from(line: String) -> Self {
        Self::Line(line)
    }
}

/// [`LineReceiver`] that replays a script.
///
/// Once the script is exhausted every call returns
/// [`TransportError::Closed`].
#[derive(Debug)]
pub struct ScriptedReceiver {
    steps: VecDeque<Step>,
    clock: ManualClock,
    line_step: Duration,
    close: CloseHandle,
    delivered: usize,
}

impl ScriptedReceiver {
    /// Receiver replaying `steps` on a fresh clock.
    pub fn new<I, S>(steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<Step>,
    {
        Self {
            steps: steps.into_iter().map(Into::into).collect(),
            clock: ManualClock::new(),
            line_step: DEFAULT_LINE_STEP,
            close: CloseHandle::new(),
            delivered: 0,
        }
    }

    /// Stamp lines from `clock` instead of a private one.
    #[must_use]
    pub fn with_clock(mut self, clock: ManualClock) -> Self {
        self.clock = clock;
        self
    }

    /// Advance the clock by `step` before each delivered line.
    #[must_use]
    pub fn with_line_step(mut self, step: Duration) -> Self {
        self.line_step = step;
        self
    }

    /// Append a step.
    pub fn push(&mut self, step: impl Into<Step>) {
        self.steps.push_back(step.into());
    }

    /// Clock used for stamping.
    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    /// Lines delivered so far.
    pub fn delivered(&self) -> usize {
        self.delivered
    }

    /// Steps not yet replayed.
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }
}

#[async_trait]
impl LineReceiver for ScriptedReceiver {
    async fn receive_line(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<ReceivedLine, TransportError> {
        if self.close.is_closed() {
            return Err(TransportError::Closed);
        }

        let Some(step) = self.steps.pop_front() else {
            return Err(TransportError::Closed);
        };
        tracing::trace!(?step, "scripted step");

        match step {
            Step::Line(line) => {
                self.clock.advance(self.line_step);
                self.delivered += 1;
                let meta = ReceiveMeta {
                    recv_ts_ns: self.clock.monotonic_ns(),
                    recv_time_unix_ns: self.clock.unix_time_ns(),
                    peer: None,
                };
                Ok(ReceivedLine { line, meta })
            },
            Step::Timeout => Err(TransportError::Timeout(timeout.unwrap_or_default())),
            Step::Disconnect(reason) => Err(TransportError::Disconnected { reason }),
            Step::Io(kind) => Err(TransportError::Io(io::Error::new(kind, "scripted fault"))),
            Step::Close => {
                self.close();
                Err(TransportError::Closed)
            },
            Step::Block => {
                self.close.closed().await;
                Err(TransportError::Closed)
            },
        }
    }

    fn close(&mut self) {
        self.close.close();
    }

    fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }
}
