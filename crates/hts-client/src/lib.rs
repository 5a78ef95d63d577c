//! Streaming client for HTS hand tracking telemetry.
//!
//! Composes a transport receiver, the decoder, and the frame assembler into
//! one pull-based event stream with hand filtering, an error policy, counters,
//! and an observer hook.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────┐  line  ┌─────────┐ packet ┌────────┐ packet ┌───────────┐
//! │ Receiver  │───────>│ decode  │───────>│ filter │───────>│ assembler │
//! │ udp / tcp │        └─────────┘        └────────┘        └───────────┘
//! └───────────┘             │ error           │                   │ frame
//!                           v                 v                   v
//!                      strict: raise     packets_filtered     StreamEvent
//!                      tolerant: drop
//! ```
//!
//! Each [`Client::next_event`] call suspends only at the network read, then
//! decodes, assembles and emits synchronously. No background tasks are
//! spawned.
//!
//! # Components
//!
//! - [`client`]: The [`Client`] iteration contract
//! - [`config`]: Client configuration and its string-parsable enums
//! - [`transport`]: UDP, TCP server, and TCP client receivers
//! - [`hook`]: Typed observer events
//! - [`stats`]: Counters
//! - [`error`]: Setup and runtime errors

#![forbid(unsafe_code)]

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod hook;
pub mod stats;
pub mod transport;

pub use client::Client;
pub use config::{ClientConfig, ErrorPolicy, HandFilter, StreamOutput, TransportMode};
pub use error::{ClientError, ConfigError};
pub use event::StreamEvent;
pub use hook::{HookError, LogEventKind, LogHook, StreamLogEvent};
pub use stats::ClientStats;
pub use transport::{Receiver, TcpClientLineReceiver, TcpServerLineReceiver, UdpLineReceiver};
