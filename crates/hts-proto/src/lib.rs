//! Wire format for HTS hand tracking telemetry.
//!
//! The upstream source emits one UTF-8 CSV record per line: a label naming
//! the hand side and packet kind, then a flat list of decimal values.
//!
//! ```text
//! Right wrist:, 0.1, 0.2, 0.3, 0.0, 0.0, 0.0, 1.0
//! Left landmarks:, x0, y0, z0, x1, y1, z1, ... (63 values)
//! ```
//!
//! Decoding is a pure function from a line to a typed [`Packet`]. Nothing in
//! this crate performs I/O or holds state, so the decoder can be called from
//! any number of flows at once.
//!
//! Assembled [`HandFrame`] values live here too, next to the packet types,
//! because they share the [`Record`] encoding used for persistence and
//! cross-process hand-off.
#![forbid(unsafe_code)]

pub mod decode;
pub mod errors;
pub mod frame;
pub mod joints;
pub mod model;
pub mod record;

pub use decode::{LANDMARK_COUNT, LANDMARK_VALUE_COUNT, WRIST_VALUE_COUNT, decode};
pub use errors::{DecodeError, RecordError, UnknownNameError};
pub use frame::HandFrame;
pub use joints::{FingerName, JointName};
pub use model::{
    HandLandmarks, HandSide, LandmarksPacket, Packet, PacketKind, Point3, WristPacket, WristPose,
};
pub use record::Record;
