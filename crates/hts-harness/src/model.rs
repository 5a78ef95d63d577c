//! Reference model of frame assembly.
//!
//! A deliberately naive re-statement of the assembly rules: remember the
//! newest accepted timestamp per (side, kind), count emissions per side. The
//! model-based test drives it and the real assembler with the same
//! operations and compares every output.

use std::collections::HashMap;

use hts_proto::{HandSide, PacketKind};

/// One operation against the assembler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operation {
    /// Push a packet
    Push {
        /// Hand side
        side: HandSide,
        /// Packet kind
        kind: PacketKind,
        /// Receive timestamp
        recv_ts_ns: u64,
        /// Marker copied into the packet's first coordinate
        marker: f64,
    },
}

/// Observable content of an emitted frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ModelFrame {
    /// Hand side
    pub side: HandSide,
    /// Per-side emission counter
    pub sequence_id: u64,
    /// Later of the two component timestamps
    pub recv_ts_ns: u64,
    /// Marker of the wrist component
    pub wrist_marker: f64,
    /// Marker of the landmarks component
    pub landmarks_marker: f64,
}

#[derive(Debug, Clone, Copy)]
struct Accepted {
    recv_ts_ns: u64,
    marker: f64,
}

/// Reference assembler.
#[derive(Debug, Default)]
pub struct ModelAssembler {
    accepted: HashMap<(HandSide, PacketKind), Accepted>,
    emitted: HashMap<HandSide, u64>,
}

impl ModelAssembler {
    /// Empty model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one operation, returning the frame it emits.
    pub fn apply(&mut self, op: &Operation) -> Option<ModelFrame> {
        let Operation::Push { side, kind, recv_ts_ns, marker } = *op;

        if let Some(previous) = self.accepted.get(&(side, kind))
            && recv_ts_ns <= previous.recv_ts_ns
        {
            return None;
        }
        self.accepted.insert((side, kind), Accepted { recv_ts_ns, marker });

        let wrist = self.accepted.get(&(side, PacketKind::Wrist))?;
        let landmarks = self.accepted.get(&(side, PacketKind::Landmarks))?;

        let count = self.emitted.entry(side).or_insert(0);
        let sequence_id = *count;
        *count += 1;

        Some(ModelFrame {
            side,
            sequence_id,
            recv_ts_ns: wrist.recv_ts_ns.max(landmarks.recv_ts_ns),
            wrist_marker: wrist.marker,
            landmarks_marker: landmarks.marker,
        })
    }

    /// Frames emitted so far for `side`.
    pub fn emitted(&self, side: HandSide) -> u64 {
        self.emitted.get(&side).copied().unwrap_or(0)
    }
}
