//! Tokio line receivers.
//!
//! Three topologies share one contract ([`LineReceiver`]):
//!
//! - [`UdpLineReceiver`]: one datagram is one line
//! - [`TcpServerLineReceiver`]: accepts one connection at a time
//! - [`TcpClientLineReceiver`]: connects out, reconnecting after a delay
//!
//! # Waiting
//!
//! Every socket wait races three signals, checked in priority order: close,
//! deadline, I/O readiness. Only cancel-safe futures are raced, so a timeout
//! never loses bytes that were already read.

mod line_buffer;
mod tcp_client;
mod tcp_server;
mod udp;

use std::{net::SocketAddr, sync::Arc, time::Duration};

use async_trait::async_trait;
use hts_core::{Clock, CloseHandle, LineReceiver, ReceiveMeta, ReceivedLine, TransportError};
use tokio::time::Instant;

pub use tcp_client::TcpClientLineReceiver;
pub use tcp_server::TcpServerLineReceiver;
pub use udp::UdpLineReceiver;

use crate::{
    config::{ClientConfig, TransportMode},
    error::ClientError,
};

/// Outcome of a bounded wait.
pub(crate) enum Wait<T> {
    Ready(T),
    Timeout,
    Closed,
}

/// Race `fut` against the close handle and an optional deadline.
pub(crate) async fn bounded<F: Future>(
    close: &CloseHandle,
    deadline: Option<Instant>,
    fut: F,
) -> Wait<F::Output> {
    let expire = async {
        match deadline {
            Some(deadline) => tokio::time::sleep_until(deadline).await,
            None => std::future::pending().await,
        }
    };

    tokio::select! {
        biased;
        () = close.closed() => Wait::Closed,
        () = expire => Wait::Timeout,
        out = fut => Wait::Ready(out),
    }
}

/// Deadline for a receive call.
pub(crate) fn deadline(timeout: Option<Duration>) -> Option<Instant> {
    timeout.map(|timeout| Instant::now() + timeout)
}

/// Clock reading taken as soon as a socket read completes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ReadStamp {
    recv_ts_ns: u64,
    recv_time_unix_ns: Option<u64>,
}

/// Receive timestamps from a [`Clock`].
///
/// Lines carry the reading of the socket read that completed them. Stamps
/// are forced strictly increasing per receiver, so two lines taken from one
/// read never share a timestamp.
pub(crate) struct Stamper {
    clock: Arc<dyn Clock>,
    last_ns: Option<u64>,
}

impl Stamper {
    pub(crate) fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock, last_ns: None }
    }

    /// Read the clock for bytes that just arrived.
    pub(crate) fn read(&self) -> ReadStamp {
        ReadStamp {
            recv_ts_ns: self.clock.monotonic_ns(),
            recv_time_unix_ns: self.clock.unix_time_ns(),
        }
    }

    pub(crate) fn line(
        &mut self,
        line: String,
        stamp: ReadStamp,
        peer: Option<SocketAddr>,
    ) -> ReceivedLine {
        let recv_ts_ns = match self.last_ns {
            Some(last) if stamp.recv_ts_ns <= last => last + 1,
            _ => stamp.recv_ts_ns,
        };
        self.last_ns = Some(recv_ts_ns);

        let meta = ReceiveMeta { recv_ts_ns, recv_time_unix_ns: stamp.recv_time_unix_ns, peer };
        ReceivedLine { line, meta }
    }
}

impl std::fmt::Debug for Stamper {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stamper").field("last_ns", &self.last_ns).finish_non_exhaustive()
    }
}

/// Receiver selected by [`ClientConfig::transport_mode`].
#[derive(Debug)]
pub enum Receiver {
    /// UDP listener
    Udp(UdpLineReceiver),
    /// TCP server
    TcpServer(TcpServerLineReceiver),
    /// TCP client
    TcpClient(TcpClientLineReceiver),
}

impl Receiver {
    /// Open the receiver `config` describes.
    ///
    /// Listening modes bind immediately; the TCP client connects on first
    /// receive.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Config`] if the configuration is invalid
    /// - [`ClientError::Bind`] if a listening socket cannot be bound
    pub async fn open(config: &ClientConfig) -> Result<Self, ClientError> {
        config.validate()?;

        let bind_error = |source| ClientError::Bind { addr: config.address(), source };
        match config.transport_mode {
            TransportMode::Udp => {
                UdpLineReceiver::bind(config).await.map(Self::Udp).map_err(bind_error)
            },
            TransportMode::TcpServer => {
                TcpServerLineReceiver::bind(config).await.map(Self::TcpServer).map_err(bind_error)
            },
            TransportMode::TcpClient => Ok(Self::TcpClient(TcpClientLineReceiver::new(config))),
        }
    }

    /// Bound address of a listening receiver.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match self {
            Self::Udp(receiver) => receiver.local_addr(),
            Self::TcpServer(receiver) => receiver.local_addr(),
            Self::TcpClient(_) => None,
        }
    }

    /// Mode of this receiver.
    pub const fn mode(&self) -> TransportMode {
        match self {
            Self::Udp(_) => TransportMode::Udp,
            Self::TcpServer(_) => TransportMode::TcpServer,
            Self::TcpClient(_) => TransportMode::TcpClient,
        }
    }
}

#[async_trait]
impl LineReceiver for Receiver {
    async fn receive_line(
        &mut self,
        timeout: Option<Duration>,
    ) -> Result<ReceivedLine, TransportError> {
        match self {
            Self::Udp(receiver) => receiver.receive_line(timeout).await,
            Self::TcpServer(receiver) => receiver.receive_line(timeout).await,
            Self::TcpClient(receiver) => receiver.receive_line(timeout).await,
        }
    }

    fn close(&mut self) {
        match self {
            Self::Udp(receiver) => receiver.close(),
            Self::TcpServer(receiver) => receiver.close(),
            Self::TcpClient(receiver) => receiver.close(),
        }
    }

    fn close_handle(&self) -> CloseHandle {
        match self {
            Self::Udp(receiver) => receiver.close_handle(),
            Self::TcpServer(receiver) => receiver.close_handle(),
            Self::TcpClient(receiver) => receiver.close_handle(),
        }
    }
}
