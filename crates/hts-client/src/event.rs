//! Stream events.

use hts_proto::{HandFrame, HandSide, Packet};

/// One item yielded by the client.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A decoded packet that passed the hand filter
    Packet(Packet),
    /// An assembled frame
    Frame(HandFrame),
}

impl StreamEvent {
    /// Hand side of the packet or frame.
    pub fn side(&self) -> HandSide {
        match self {
            Self::Packet(packet) => packet.side(),
            Self::Frame(frame) => frame.side,
        }
    }

    /// The packet, if this is a packet event.
    pub fn as_packet(&self) -> Option<&Packet> {
        match self {
            Self::Packet(packet) => Some(packet),
            Self::Frame(_) => None,
        }
    }

    /// The frame, if this is a frame event.
    pub fn as_frame(&self) -> Option<&HandFrame> {
        match self {
            Self::Frame(frame) => Some(frame),
            Self::Packet(_) => None,
        }
    }
}
