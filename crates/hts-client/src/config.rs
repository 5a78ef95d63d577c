//! Client configuration.
//!
//! [`ClientConfig`] is a plain struct with defaults and per-mode
//! constructors. Enum-valued fields parse from the same lowercase tokens the
//! CLI accepts.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc, time::Duration};

use hts_proto::HandSide;

use crate::{error::ConfigError, hook::LogHook};

/// Default bind/remote host.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port.
pub const DEFAULT_PORT: u16 = 9000;

/// Default per-receive timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Default wait between TCP client connection attempts.
pub const DEFAULT_RECONNECT_DELAY: Duration = Duration::from_millis(250);

/// Default bound on one TCP client connection attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default limit on a buffered partial TCP line (256 KiB).
pub const DEFAULT_MAX_LINE_BYTES: usize = 256 * 1024;

/// Default UDP receive buffer.
pub const DEFAULT_MAX_DATAGRAM_SIZE: usize = 65_535;

fn parse_token<T: Copy>(
    field: &'static str,
    value: &str,
    table: &[(&str, T)],
) -> Result<T, ConfigError> {
    let normalized = value.trim().to_ascii_lowercase().replace('-', "_");
    table
        .iter()
        .find(|(token, _)| *token == normalized)
        .map(|(_, parsed)| *parsed)
        .ok_or_else(|| ConfigError::UnknownValue { field, value: value.to_string() })
}

/// Network topology used to receive lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Listen for datagrams
    #[default]
    Udp,
    /// Listen for one TCP connection at a time
    TcpServer,
    /// Connect out to a TCP server, reconnecting on loss
    TcpClient,
}

impl TransportMode {
    /// Configuration token.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Udp => "udp",
            Self::TcpServer => "tcp_server",
            Self::TcpClient => "tcp_client",
        }
    }
}

impl fmt::Display for TransportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(
            "transport_mode",
            s,
            &[("udp", Self::Udp), ("tcp_server", Self::TcpServer), ("tcp_client", Self::TcpClient)],
        )
    }
}

/// Which events the client yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StreamOutput {
    /// Decoded packets only
    Packets,
    /// Assembled frames only
    #[default]
    Frames,
    /// Packets, each followed by the frame it completed
    Both,
}

impl StreamOutput {
    /// Whether packets are yielded.
    pub const fn includes_packets(self) -> bool {
        matches!(self, Self::Packets | Self::Both)
    }

    /// Whether frames are yielded.
    pub const fn includes_frames(self) -> bool {
        matches!(self, Self::Frames | Self::Both)
    }
}

impl FromStr for StreamOutput {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token(
            "output",
            s,
            &[("packets", Self::Packets), ("frames", Self::Frames), ("both", Self::Both)],
        )
    }
}

/// Which hand sides pass the client filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HandFilter {
    /// Left hand only
    Left,
    /// Right hand only
    Right,
    /// Both hands
    #[default]
    Both,
}

impl HandFilter {
    /// Whether packets for `side` pass.
    pub const fn matches(self, side: HandSide) -> bool {
        matches!(
            (self, side),
            (Self::Both, _) | (Self::Left, HandSide::Left) | (Self::Right, HandSide::Right)
        )
    }
}

impl FromStr for HandFilter {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("hand_filter", s, &[("left", Self::Left), ("right", Self::Right), ("both", Self::Both)])
    }
}

/// Reaction to a line that fails to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Raise the decode error and end the stream
    #[default]
    Strict,
    /// Count the line as dropped and continue
    Tolerant,
}

impl FromStr for ErrorPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_token("error_policy", s, &[("strict", Self::Strict), ("tolerant", Self::Tolerant)])
    }
}

/// Streaming client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    /// Network topology
    pub transport_mode: TransportMode,
    /// Bind host (udp, tcp_server) or remote host (tcp_client)
    pub host: String,
    /// Bind or remote port; 0 binds an ephemeral port
    pub port: u16,
    /// Per-receive timeout; `None` blocks indefinitely
    pub timeout: Option<Duration>,
    /// Wait before each TCP client reconnect attempt
    pub reconnect_delay: Duration,
    /// Bound on one TCP client connection attempt
    pub connect_timeout: Duration,
    /// Events to yield
    pub output: StreamOutput,
    /// Hand sides to keep
    pub hand_filter: HandFilter,
    /// Decode failure handling
    pub error_policy: ErrorPolicy,
    /// Copy wall-clock receive time onto frames
    pub include_wall_time: bool,
    /// Per-side frame id overrides
    pub frame_id_by_side: BTreeMap<HandSide, String>,
    /// Limit on a buffered partial TCP line
    pub max_line_bytes: usize,
    /// UDP receive buffer size
    pub max_datagram_size: usize,
    /// Observer for stream events
    pub log_hook: Option<Arc<dyn LogHook>>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            transport_mode: TransportMode::Udp,
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: Some(DEFAULT_TIMEOUT),
            reconnect_delay: DEFAULT_RECONNECT_DELAY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            output: StreamOutput::Frames,
            hand_filter: HandFilter::Both,
            error_policy: ErrorPolicy::Strict,
            include_wall_time: true,
            frame_id_by_side: BTreeMap::new(),
            max_line_bytes: DEFAULT_MAX_LINE_BYTES,
            max_datagram_size: DEFAULT_MAX_DATAGRAM_SIZE,
            log_hook: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("transport_mode", &self.transport_mode)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("timeout", &self.timeout)
            .field("reconnect_delay", &self.reconnect_delay)
            .field("connect_timeout", &self.connect_timeout)
            .field("output", &self.output)
            .field("hand_filter", &self.hand_filter)
            .field("error_policy", &self.error_policy)
            .field("include_wall_time", &self.include_wall_time)
            .field("frame_id_by_side", &self.frame_id_by_side)
            .field("max_line_bytes", &self.max_line_bytes)
            .field("max_datagram_size", &self.max_datagram_size)
            .field("log_hook", &self.log_hook.as_ref().map(|_| "LogHook"))
            .finish()
    }
}

impl ClientConfig {
    fn for_mode(transport_mode: TransportMode, host: impl Into<String>, port: u16) -> Self {
        Self { transport_mode, host: host.into(), port, ..Self::default() }
    }

    /// Listen for datagrams on `host:port`.
    pub fn udp(host: impl Into<String>, port: u16) -> Self {
        Self::for_mode(TransportMode::Udp, host, port)
    }

    /// Accept TCP connections on `host:port`.
    pub fn tcp_server(host: impl Into<String>, port: u16) -> Self {
        Self::for_mode(TransportMode::TcpServer, host, port)
    }

    /// Connect to a TCP server at `host:port`.
    pub fn tcp_client(host: impl Into<String>, port: u16) -> Self {
        Self::for_mode(TransportMode::TcpClient, host, port)
    }

    /// Install an observer hook.
    #[must_use]
    pub fn with_log_hook(mut self, hook: impl LogHook + 'static) -> Self {
        self.log_hook = Some(Arc::new(hook));
        self
    }

    /// Override the frame id for one side.
    #[must_use]
    pub fn with_frame_id(mut self, side: HandSide, frame_id: impl Into<String>) -> Self {
        self.frame_id_by_side.insert(side, frame_id.into());
        self
    }

    /// `host:port` for log fields and bind errors.
    pub fn address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    /// Check the configuration before any I/O.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::EmptyHost);
        }
        if self.port == 0 && self.transport_mode == TransportMode::TcpClient {
            return Err(ConfigError::ZeroPort { mode: self.transport_mode });
        }
        if self.timeout.is_some_and(|timeout| timeout.is_zero()) {
            return Err(ConfigError::ZeroTimeout);
        }
        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroConnectTimeout);
        }
        if self.max_line_bytes == 0 {
            return Err(ConfigError::ZeroLimit { field: "max_line_bytes" });
        }
        if self.max_datagram_size == 0 {
            return Err(ConfigError::ZeroLimit { field: "max_datagram_size" });
        }
        if let Some((side, _)) = self.frame_id_by_side.iter().find(|(_, id)| id.trim().is_empty()) {
            return Err(ConfigError::EmptyFrameId { side: *side });
        }
        Ok(())
    }
}
