//! Line receiver abstraction.
//!
//! Abstracts over the three supported topologies (UDP listener, TCP server,
//! TCP client). Production uses tokio sockets, tests use scripted receivers
//! from `hts-harness`. Either way the consumer sees a lazy sequence of
//! timestamped text lines with the same timeout, disconnect and close
//! semantics.

use std::{io, net::SocketAddr, time::Duration};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Metadata captured when a line's bytes were read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReceiveMeta {
    /// Monotonic receive timestamp in nanoseconds
    pub recv_ts_ns: u64,
    /// Wall-clock receive time in Unix nanoseconds
    pub recv_time_unix_ns: Option<u64>,
    /// Sender address, when the transport knows it
    pub peer: Option<SocketAddr>,
}

/// One protocol line with its receive metadata.
///
/// The line has its trailing newline removed but is otherwise untouched;
/// invalid UTF-8 was replaced lossily.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceivedLine {
    /// Line text
    pub line: String,
    /// Receive metadata
    pub meta: ReceiveMeta,
}

/// Transport failures.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No complete line arrived within the timeout
    #[error("no line received within {0:?}")]
    Timeout(Duration),

    /// The peer went away; the next call reconnects or re-accepts
    #[error("peer disconnected: {reason}")]
    Disconnected {
        /// Why the connection ended
        reason: String,
    },

    /// The receiver was closed
    #[error("receiver closed")]
    Closed,

    /// Unrecoverable socket error
    #[error("transport I/O error: {0}")]
    Io(#[from] io::Error),
}

impl TransportError {
    /// Whether calling `receive_line` again can make progress.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Disconnected { .. })
    }
}

/// Cloneable close signal for a receiver.
///
/// Closing is idempotent and visible to every clone, from any task or
/// thread. A `receive_line` blocked when the handle closes returns
/// [`TransportError::Closed`].
#[derive(Debug, Clone, Default)]
pub struct CloseHandle {
    token: CancellationToken,
}

impl CloseHandle {
    /// Create an open handle.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal close.
    pub fn close(&self) {
        self.token.cancel();
    }

    /// Whether close has been signalled.
    pub fn is_closed(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolve once close has been signalled.
    pub async fn closed(&self) {
        self.token.cancelled().await;
    }
}

/// Source of protocol lines.
///
/// Single reader: `receive_line` takes `&mut self`, so one consumer owns the
/// receive path. Closing from elsewhere goes through [`CloseHandle`].
#[async_trait]
pub trait LineReceiver: Send {
    /// Receive the next complete line.
    ///
    /// `timeout` of `None` waits indefinitely. A timeout never discards a
    /// buffered partial line.
    ///
    /// # Errors
    ///
    /// - [`TransportError::Timeout`] if no line completes within `timeout`
    /// - [`TransportError::Disconnected`] if the peer went away
    /// - [`TransportError::Closed`] once the receiver is closed
    /// - [`TransportError::Io`] on an unrecoverable socket fault
    async fn receive_line(&mut self, timeout: Option<Duration>)
    -> Result<ReceivedLine, TransportError>;

    /// Close the receiver and release its socket. Idempotent.
    fn close(&mut self);

    /// Handle that closes this receiver from another context.
    fn close_handle(&self) -> CloseHandle;
}

#[async_trait]
impl<R: LineReceiver + ?Sized> LineReceiver for Box<R> {
    async fn receive_line(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<ReceivedLine, TransportError> {
        (**self).receive_line(timeout).await
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn close_handle(&self) -> CloseHandle {
        (**self).close_handle()
    }
}
