//! Command line flags and their mapping onto [`ClientConfig`].

use std::time::Duration;

use clap::Parser;
use hts_client::{
    ClientConfig, ErrorPolicy, HandFilter, StreamOutput, TransportMode,
    config::{DEFAULT_HOST, DEFAULT_PORT},
};
use hts_proto::HandSide;

/// Stream HTS hand tracking telemetry as JSON lines.
#[derive(Debug, Parser)]
#[command(name = "hts-stream", author, version, about)]
pub struct Args {
    /// Transport: udp, tcp_server or tcp_client
    #[arg(long, default_value_t = TransportMode::Udp)]
    pub mode: TransportMode,

    /// Bind host (udp, tcp_server) or remote host (tcp_client)
    #[arg(long, default_value = DEFAULT_HOST)]
    pub host: String,

    /// Bind or remote port
    #[arg(long, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Per-receive timeout in milliseconds
    #[arg(long, default_value_t = 1000, conflicts_with = "no_timeout")]
    pub timeout_ms: u64,

    /// Block on receive without a timeout
    #[arg(long)]
    pub no_timeout: bool,

    /// Delay between tcp_client connection attempts in milliseconds
    #[arg(long, default_value_t = 250)]
    pub reconnect_delay_ms: u64,

    /// Bound on one tcp_client connection attempt in milliseconds
    #[arg(long, default_value_t = 5000)]
    pub connect_timeout_ms: u64,

    /// Events to emit: packets, frames or both
    #[arg(long, default_value = "frames")]
    pub output: StreamOutput,

    /// Hands to keep: left, right or both
    #[arg(long, default_value = "both")]
    pub hand: HandFilter,

    /// Decode failures: strict stops, tolerant drops the line
    #[arg(long, default_value = "strict")]
    pub error_policy: ErrorPolicy,

    /// Stop after this many events
    #[arg(long)]
    pub max_events: Option<u64>,

    /// Convert Unity left-handed coordinates to right-handed before output
    #[arg(long)]
    pub right_handed: bool,

    /// Omit wall-clock receive times from frames
    #[arg(long)]
    pub no_wall_time: bool,

    /// Frame id for left hand frames
    #[arg(long)]
    pub left_frame_id: Option<String>,

    /// Frame id for right hand frames
    #[arg(long)]
    pub right_frame_id: Option<String>,
}

impl Args {
    /// Client configuration described by the flags.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig {
            transport_mode: self.mode,
            host: self.host.clone(),
            port: self.port,
            timeout: (!self.no_timeout).then(|| Duration::from_millis(self.timeout_ms)),
            reconnect_delay: Duration::from_millis(self.reconnect_delay_ms),
            connect_timeout: Duration::from_millis(self.connect_timeout_ms),
            output: self.output,
            hand_filter: self.hand,
            error_policy: self.error_policy,
            include_wall_time: !self.no_wall_time,
            ..ClientConfig::default()
        };

        let frame_ids = [(HandSide::Left, &self.left_frame_id), (HandSide::Right, &self.right_frame_id)];
        for (side, frame_id) in frame_ids {
            if let Some(frame_id) = frame_id {
                config = config.with_frame_id(side, frame_id.clone());
            }
        }
        config
    }
}
