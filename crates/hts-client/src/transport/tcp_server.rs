//! TCP server receiver.
//!
//! Listens on one address and serves one connection at a time. When the
//! peer goes away the partial line is discarded, the call reports
//! `Disconnected`, and the next call accepts a new connection.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use hts_core::{Clock, CloseHandle, LineReceiver, ReceivedLine, SystemClock, TransportError};
use tokio::{
    io::AsyncReadExt,
    net::{TcpListener, TcpStream},
};

use super::{Stamper, Wait, bounded, deadline, line_buffer::LineBuffer};
use crate::config::ClientConfig;

#[derive(Debug)]
struct Connection {
    stream: TcpStream,
    peer: SocketAddr,
}

/// Accepts one TCP connection at a time and yields its lines.
#[derive(Debug)]
pub struct TcpServerLineReceiver {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    conn: Option<Connection>,
    buffer: LineBuffer,
    stamper: Stamper,
    close: CloseHandle,
}

impl TcpServerLineReceiver {
    /// Listen on `config.host:config.port`.
    ///
    /// # Errors
    ///
    /// Returns the bind failure.
    pub async fn bind(config: &ClientConfig) -> io::Result<Self> {
        let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
        let local_addr = listener.local_addr()?;
        tracing::info!(%local_addr, "tcp server listening");

        Ok(Self {
            listener: Some(listener),
            local_addr,
            conn: None,
            buffer: LineBuffer::new(config.max_line_bytes),
            stamper: Stamper::new(Arc::new(SystemClock)),
            close: CloseHandle::new(),
        })
    }

    /// Stamp lines from `clock`.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.stamper = Stamper::new(clock);
        self
    }

    /// Listening address, until closed.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.listener.as_ref().map(|_| self.local_addr)
    }

    /// Peer of the current connection.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.conn.as_ref().map(|conn| conn.peer)
    }

    fn disconnect(&mut self, reason: String) -> TransportError {
        if let Some(conn) = self.conn.take() {
            tracing::debug!(peer = %conn.peer, discarded = self.buffer.len(), %reason, "tcp peer disconnected");
        }
        self.buffer.clear();
        TransportError::Disconnected { reason }
    }

    fn release(&mut self) -> TransportError {
        self.conn = None;
        self.buffer.clear();
        if self.listener.take().is_some() {
            tracing::debug!(local_addr = %self.local_addr, "tcp server closed");
        }
        TransportError::Closed
    }
}

#[async_trait]
impl LineReceiver for TcpServerLineReceiver {
    async fn receive_line(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<ReceivedLine, TransportError> {
        let deadline = deadline(timeout);

        loop {
            if self.close.is_closed() {
                return Err(self.release());
            }

            if let Some(conn) = &self.conn {
                let peer = conn.peer;
                if let Some((line, stamp)) = self.buffer.next_line() {
                    tracing::trace!(%peer, len = line.len(), "line received");
                    return Ok(self.stamper.line(line, stamp, Some(peer)));
                }
                if self.buffer.is_overflowing() {
                    tracing::warn!(%peer, limit = self.buffer.max_line_bytes(), "line too long, dropping connection");
                    let reason = format!("line exceeds {} bytes", self.buffer.max_line_bytes());
                    return Err(self.disconnect(reason));
                }
            }

            if self.conn.is_none() {
                let Some(listener) = &self.listener else {
                    return Err(TransportError::Closed);
                };
                match bounded(&self.close, deadline, listener.accept()).await {
                    Wait::Ready(Ok((stream, peer))) => {
                        tracing::info!(%peer, "tcp peer connected");
                        self.buffer.clear();
                        self.conn = Some(Connection { stream, peer });
                    },
                    Wait::Ready(Err(err)) => return Err(TransportError::Io(err)),
                    Wait::Timeout => return Err(TransportError::Timeout(timeout.unwrap_or_default())),
                    Wait::Closed => return Err(self.release()),
                }
                continue;
            }
            let Some(conn) = self.conn.as_mut() else {
                continue;
            };

            let read = conn.stream.read_buf(self.buffer.read_target());
            match bounded(&self.close, deadline, read).await {
                Wait::Ready(Ok(0)) => return Err(self.disconnect("peer closed connection".into())),
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
