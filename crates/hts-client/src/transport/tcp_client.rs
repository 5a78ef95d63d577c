//! TCP client receiver.
//!
//! Connects lazily on the first receive. After a failed attempt or a lost
//! connection the next attempt waits `reconnect_delay`, and attempts repeat
//! until one succeeds or the receiver is closed. Reconnecting happens inline
//! in `receive_line`, bounded by the caller's timeout; the pending retry time
//! survives a timeout, so timing out never shortens the delay.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use hts_core::{Clock, CloseHandle, LineReceiver, ReceivedLine, SystemClock, TransportError};
use tokio::{
    io::AsyncReadExt,
    net::TcpStream,
    time::{Instant, sleep_until, timeout as with_timeout},
};

use super::{Stamper, Wait, bounded, deadline, line_buffer::LineBuffer};
use crate::config::ClientConfig;

/// Connects to a TCP server and yields its lines.
#[derive(Debug)]
pub struct TcpClientLineReceiver {
    host: String,
    port: u16,
    connect_timeout: Duration,
    reconnect_delay: Duration,
    stream: Option<TcpStream>,
    peer: Option<SocketAddr>,
    retry_at: Option<Instant>,
    attempts: u64,
    buffer: LineBuffer,
    stamper: Stamper,
    close: CloseHandle,
}

impl TcpClientLineReceiver {
    /// Receiver for `config.host:config.port`. Performs no I/O.
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            connect_timeout: config.connect_timeout,
            reconnect_delay: config.reconnect_delay,
            stream: None,
            peer: None,
            retry_at: None,
            attempts: 0,
            buffer: LineBuffer::new(config.max_line_bytes),
            stamper: Stamper::new(Arc::new(SystemClock)),
            close: CloseHandle::new(),
        }
    }

    /// Stamp lines from `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.stamper = Stamper::new(clock);
        self
    }

    /// Connection attempts made so far, successful or not.
    pub fn connect_attempts(&self) -> u64 {
        self.attempts
    }

    /// Whether a connection is currently established.
    pub fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn schedule_retry(&mut self) {
        self.retry_at = Some(Instant::now() + self.reconnect_delay);
    }

    fn disconnect(&mut self, reason: String) -> TransportError {
        if self.stream.take().is_some() {
            tracing::debug!(peer = ?self.peer, discarded = self.buffer.len(), %reason, "tcp connection lost");
        }
        self.buffer.clear();
        self.schedule_retry();
        TransportError::Disconnected { reason }
    }

    fn release(&mut self) -> TransportError {
        if self.stream.take().is_some() {
            tracing::debug!(peer = ?self.peer, "tcp client closed");
        }
        self.buffer.clear();
        self.retry_at = None;
        TransportError::Closed
    }

    /// One connection attempt, honoring the pending retry delay.
    ///
    /// `Ready` means the attempt finished, successfully or not.
    async fn connect(&mut self, deadline: Option<Instant>) -> Wait<()> {
        if let Some(retry_at) = self.retry_at {
            match bounded(&self.close, deadline, sleep_until(retry_at)).await {
                Wait::Ready(()) => self.retry_at = None,
                Wait::Timeout => return Wait::Timeout,
                Wait::Closed => return Wait::Closed,
            }
        }

        self.attempts += 1;
        let attempt = self.attempts;
        let connect =
            with_timeout(self.connect_timeout, TcpStream::connect((self.host.as_str(), self.port)));

        match bounded(&self.close, deadline, connect).await {
            Wait::Ready(Ok(Ok(stream))) => {
                self.peer = stream.peer_addr().ok();
                tracing::info!(peer = ?self.peer, attempt, "tcp client connected");
                self.buffer.clear();
                self.stream = Some(stream);
            },
            Wait::Ready(Ok(Err(err))) => {
                tracing::warn!(host = %self.host, port = self.port, attempt, error = %err, "tcp connect failed");
                self.schedule_retry();
            },
            Wait::Ready(Err(_elapsed)) => {
                tracing::warn!(host = %self.host, port = self.port, attempt, timeout = ?self.connect_timeout, "tcp connect timed out");
                self.schedule_retry();
            },
            Wait::Timeout => return Wait::Timeout,
            Wait::Closed => return Wait::Closed,
        }
        Wait::Ready(())
    }
}

#[async_trait]
impl LineReceiver for TcpClientLineReceiver {
    async fn receive_line(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<ReceivedLine, TransportError> {
        let deadline = deadline(timeout);

        loop {
            if self.close.is_closed() {
                return Err(self.release());
            }

            if self.stream.is_some() {
                if let Some((line, stamp)) = self.buffer.next_line() {
                    tracing::trace!(peer = ?self.peer, len = line.len(), "line received");
                    return Ok(self.stamper.line(line, stamp, self.peer));
                }
                if self.buffer.is_overflowing() {
                    tracing::warn!(peer = ?self.peer, limit = self.buffer.max_line_bytes(), "line too long, dropping connection");
                    let reason = format!("line exceeds {} bytes", self.buffer.max_line_bytes());
                    return Err(self.disconnect(reason));
                }
            }

            if self.stream.is_none() {
                match self.connect(deadline).await {
                    Wait::Ready(()) => continue,
                    Wait::Timeout => return Err(TransportError::Timeout(timeout.unwrap_or_default())),
                    Wait::Closed => return Err(self.release()),
                }
            }
            let Some(stream) = self.stream.as_mut() else {
                continue;
            };

            let read = stream.read_buf(self.buffer.read_target());
            match bounded(&self.close, deadline, read).await {
                Wait::Ready(Ok(0)) => return Err(self.disconnect("server closed connection".into())),
                Wait::Ready(Ok(_)) => self.buffer.record_read(self.stamper.read()),
                Wait::Ready(Err(err)) => return Err(self.disconnect(err.to_string())),
                Wait::Timeout => return Err(TransportError::Timeout(timeout.unwrap_or_default())),
                Wait::Closed => return Err(self.release()),
            }
        }
    }

    fn close(&mut self) {
        self.close.close();
        self.release();
    }

    fn close_handle(&self) -> CloseHandle {
        self.close.clone()
    }
}
