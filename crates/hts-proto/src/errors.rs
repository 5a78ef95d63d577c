//! Error types for decoding, record encoding, and name lookup.

use thiserror::Error;

use crate::model::PacketKind;

/// A line that could not be decoded into a packet.
///
/// Each variant names the rule the line violated. Decoding never produces a
/// partially populated packet alongside one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Line was empty or whitespace only
    #[error("empty line")]
    Empty,

    /// No `:` between label and payload
    #[error("missing ':' separator")]
    MissingSeparator,

    /// Label is not exactly `<Side> <kind>`
    #[error("invalid label: {0:?}")]
    InvalidLabel(String),

    /// Side token is neither `Left` nor `Right`
    #[error("unsupported hand side: {0:?}")]
    UnknownSide(String),

    /// Kind token is neither `wrist` nor `landmarks`
    #[error("unsupported packet type: {0:?}")]
    UnknownKind(String),

    /// A payload value is not a finite decimal number
    #[error("malformed number at position {index}: {value:?}")]
    MalformedNumber {
        /// Zero-based position among the non-empty payload values
        index: usize,
        /// The offending text
        value: String,
    },

    /// Payload has the wrong number of values for its kind
    #[error("{kind} packet must contain {expected} values, got {actual}")]
    WrongCount {
        /// Packet kind named by the label
        kind: PacketKind,
        /// Required value count
        expected: usize,
        /// Value count found
        actual: usize,
    },
}

/// Structured record encoding or decoding failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Serializing to CBOR failed
    #[error("failed to encode record: {0}")]
    Encode(String),

    /// Input bytes are not a valid record of the requested type
    #[error("failed to decode record: {0}")]
    Decode(String),
}

/// Joint or finger name lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UnknownNameError {
    /// No streamed joint has this name
    #[error("unknown joint name: {0:?}")]
    Joint(String),

    /// No finger group has this name
    #[error("unknown finger name: {0:?}")]
    Finger(String),
}
