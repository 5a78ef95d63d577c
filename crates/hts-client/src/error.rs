//! Client error types.

use std::{io, time::Duration};

use hts_proto::{DecodeError, HandSide};

use crate::{config::TransportMode, hook::HookError};

/// Invalid configuration. Raised before any I/O and always fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Host is empty
    #[error("host must not be empty")]
    EmptyHost,

    /// Port 0 where a concrete port is required
    #[error("port must be non-zero in {mode} mode")]
    ZeroPort {
        /// Mode that requires the port
        mode: TransportMode,
    },

    /// Receive timeout of zero
    #[error("timeout must be positive (use no timeout to block)")]
    ZeroTimeout,

    /// Connect timeout of zero
    #[error("connect timeout must be positive")]
    ZeroConnectTimeout,

    /// A buffer limit of zero
    #[error("{field} must be positive")]
    ZeroLimit {
        /// Offending field
        field: &'static str,
    },

    /// A frame id override is empty
    #[error("frame id for {side} hand must not be empty")]
    EmptyFrameId {
        /// Side with the empty override
        side: HandSide,
    },

    /// A string value that names no variant
    #[error("invalid {field}: {value:?}")]
    UnknownValue {
        /// Field being parsed
        field: &'static str,
        /// Rejected input
        value: String,
    },
}

/// Errors surfaced by the streaming client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Configuration rejected
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listening socket could not be bound
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested address
        addr: String,
        /// Underlying failure
        source: io::Error,
    },

    /// No line received within the configured timeout
    #[error("no data received within {0:?}")]
    Timeout(Duration),

    /// Peer disconnected; the next pull reconnects or re-accepts
    #[error("peer disconnected: {reason}")]
    Disconnected {
        /// Why the connection ended
        reason: String,
    },

    /// A line failed to decode under the strict policy
    #[error("failed to decode {line:?}: {source}")]
    Decode {
        /// Offending line
        line: String,
        /// Decode failure
        source: DecodeError,
    },

    /// Unrecoverable socket fault
    #[error("transport error: {0}")]
    Transport(#[source] io::Error),

    /// The event callback passed to `run` failed
    #[error("event callback failed: {0}")]
    Callback(#[source] HookError),
}

impl ClientError {
    /// Whether the stream has ended.
    pub fn is_terminal(&self) -> bool {
        !self.is_recoverable()
    }

    /// Whether pulling again can yield more events.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Disconnected { .. })
    }
}
