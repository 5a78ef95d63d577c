//! UDP listener.
//!
//! One datagram is one line. Empty and truncated datagrams are delivered as
//! they are; rejecting them is the decoder's job.

use std::{io, net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use hts_core::{Clock, CloseHandle, LineReceiver, ReceivedLine, SystemClock, TransportError};
use tokio::net::UdpSocket;

use super::{Stamper, Wait, bounded, deadline};
use crate::config::ClientConfig;

/// Receives one line per datagram.
#[derive(Debug)]
pub struct UdpLineReceiver {
    socket: Option<UdpSocket>,
    local_addr: SocketAddr,
    buf: Vec<u8>,
    stamper: Stamper,
    close: CloseHandle,
}

impl UdpLineReceiver {
    /// Bind to `config.host:config.port`.
    ///
    /// # Errors
    ///
    /// Returns the bind failure.
    pub async fn bind(config: &ClientConfig) -> io::Result<Self> {
        let socket = UdpSocket::bind((config.host.as_str(), config.port)).await?;
        let local_addr = socket.local_addr()?;
        tracing::info!(%local_addr, "udp receiver bound");

        Ok(Self {
            socket: Some(socket),
            local_addr,
            buf: vec![0; config.max_datagram_size],
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

    /// Bound address, until closed.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.socket.as_ref().map(|_| self.local_addr)
    }

    fn release(&mut self) {
        if self.socket.take().is_some() {
            tracing::debug!(local_addr = %self.local_addr, "udp receiver closed");
        }
    }
}

#[async_trait]
impl LineReceiver for UdpLineReceiver {
    async fn receive_line(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<ReceivedLine, TransportError> {
        let Some(socket) = self.socket.as_ref().filter(|_| !self.close.is_closed()) else {
            self.release();
            return Err(TransportError::Closed);
        };

        match bounded(&self.close, deadline(timeout), socket.recv_from(&mut self.buf)).await {
            Wait::Ready(Ok((len, peer))) => {
                let stamp = self.stamper.read();
                let text = String::from_utf8_lossy(&self.buf[..len]);
                let line = text.trim_end_matches(['\r', '\n']).to_string();
                tracing::trace!(%peer, len, "datagram received");
                Ok(self.stamper.line(line, stamp, Some(peer)))
            },
            Wait::Ready(Err(err)) => Err(TransportError::Io(err)),
            Wait::Timeout => Err(TransportError::Timeout(timeout.unwrap_or_default())),
            Wait::Closed => {
                self.release();
                Err(TransportError::Closed)
            },
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
