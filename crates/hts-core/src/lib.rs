//! HTS stream core logic
//!
//! Frame assembly and the transport contract, decoupled from sockets and
//! runtimes.
//!
//! # Architecture
//!
//! The assembler is a deterministic state machine: it consumes decoded
//! packets whose timestamps were captured by the caller and returns the frames
//! they complete. It never reads a clock or touches the network, so the same
//! code runs under production receivers and scripted test doubles.
//!
//! Receivers sit behind the [`transport::LineReceiver`] trait. Concrete UDP
//! and TCP receivers live in `hts-client`; this crate only fixes the contract
//! (timeout, disconnect, and close signals) they all honor.
//!
//! # Components
//!
//! - [`assembler`]: Per-side frame assembly (staleness, sequencing)
//! - [`transport`]: Line receiver abstraction and close handles
//! - [`clock`]: Monotonic and wall-clock time sources
//! - [`convert`]: Coordinate conversions over the data model

pub mod assembler;
pub mod clock;
pub mod convert;
pub mod transport;

pub use assembler::{AssemblyState, FrameStamps, HandFrameAssembler};
pub use clock::{Clock, SystemClock};
pub use transport::{CloseHandle, LineReceiver, ReceiveMeta, ReceivedLine, TransportError};
