//! Per-side frame assembly.
//!
//! Wrist and landmarks packets arrive independently. The assembler keeps the
//! latest accepted packet of each kind per side and emits a [`HandFrame`]
//! whenever an accepted packet leaves both slots populated.
//!
//! # State Machine (per side)
//!
//! ```text
//! ┌───────┐  first packet  ┌─────────┐  other kind  ┌───────┐
//! │ Empty │───────────────>│ Partial │─────────────>│ Ready │──┐
//! └───────┘                └─────────┘              └───────┘  │ any fresh packet
//!                               │ same kind             ^      │ (emits a frame)
//!                               └──────(stays)          └──────┘
//! ```
//!
//! There is no terminal state and no reset: a side stays `Ready` for the life
//! of the assembler, and its sequence counter only moves forward.
//!
//! # Staleness
//!
//! A packet whose `recv_ts_ns` does not advance past the stored packet of the
//! same side and kind is rejected without touching state. Acceptance is
//! therefore strictly monotonic per (side, kind), which discards duplicates
//! and out-of-order retransmits.

use hts_proto::{
    DecodeError, HandFrame, HandSide, LandmarksPacket, Packet, PacketKind, WristPacket, decode,
};

/// Default frame id for the left hand.
pub const DEFAULT_LEFT_FRAME_ID: &str = "hts_left_hand";

/// Default frame id for the right hand.
pub const DEFAULT_RIGHT_FRAME_ID: &str = "hts_right_hand";

/// Assembly progress of one side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    /// No packet seen
    Empty,
    /// Exactly one of wrist/landmarks present
    Partial,
    /// Both present; every accepted packet emits a frame
    Ready,
}

/// Per-push metadata copied onto an emitted frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStamps {
    /// Wall-clock receive time in Unix nanoseconds
    pub recv_time_unix_ns: Option<u64>,
    /// Upstream timestamp, passed through untouched
    pub source_ts_ns: Option<u64>,
}

#[derive(Debug, Clone, Default)]
struct SideState {
    latest_wrist: Option<WristPacket>,
    latest_landmarks: Option<LandmarksPacket>,
    next_sequence_id: u64,
}

impl SideState {
    fn latest_ts(&self, kind: PacketKind) -> Option<u64> {
        match kind {
            PacketKind::Wrist => self.latest_wrist.map(|packet| packet.recv_ts_ns),
            PacketKind::Landmarks => self.latest_landmarks.map(|packet| packet.recv_ts_ns),
        }
    }
}

/// Frame assembler for both hand sides.
///
/// One mutator at a time: `push` takes `&mut self`, so the staleness check
/// and the store it guards always happen together.
#[derive(Debug, Clone)]
pub struct HandFrameAssembler {
    /// Indexed by [`HandSide::index`], created on the side's first packet
    sides: [Option<SideState>; 2],
    frame_ids: [String; 2],
}

impl Default for HandFrameAssembler {
    fn default() -> Self {
        Self::new()
    }
}

impl HandFrameAssembler {
    /// Create an assembler with the default frame ids.
    pub fn new() -> Self {
        Self {
            sides: [None, None],
            frame_ids: [DEFAULT_LEFT_FRAME_ID.to_string(), DEFAULT_RIGHT_FRAME_ID.to_string()],
        }
    }

    /// Override the frame id used for one side.
    #[must_use]
    pub fn with_frame_id(mut self, side: HandSide, frame_id: impl Into<String>) -> Self {
        self.frame_ids[side.index()] = frame_id.into();
        self
    }

    /// Frame id used for `side`.
    pub fn frame_id(&self, side: HandSide) -> &str {
        &self.frame_ids[side.index()]
    }

    /// Push one packet, returning the frame it completes.
    pub fn push(&mut self, packet: Packet) -> Option<HandFrame> {
        self.push_with(packet, FrameStamps::default())
    }

    /// Push one packet with extra stamps for the emitted frame.
    ///
    /// Returns `None` when the packet is stale or the side is still partial.
    pub fn push_with(&mut self, packet: Packet, stamps: FrameStamps) -> Option<HandFrame> {
        let side = packet.side();
        let state = self.sides[side.index()].get_or_insert_with(SideState::default);

        if let Some(latest_ts) = state.latest_ts(packet.kind())
            && latest_ts >= packet.recv_ts_ns()
        {
            tracing::trace!(
                %side,
                kind = %packet.kind(),
                recv_ts_ns = packet.recv_ts_ns(),
                latest_ts,
                "rejected stale packet"
            );
            return None;
        }

        match packet {
            Packet::Wrist(wrist) => state.latest_wrist = Some(wrist),
            Packet::Landmarks(landmarks) => state.latest_landmarks = Some(landmarks),
        }

        let (Some(wrist), Some(landmarks)) = (state.latest_wrist, state.latest_landmarks) else {
            return None;
        };

        let sequence_id = state.next_sequence_id;
        state.next_sequence_id += 1;

        Some(HandFrame {
            side,
            frame_id: self.frame_ids[side.index()].clone(),
            wrist: wrist.pose,
            landmarks: landmarks.landmarks,
            sequence_id,
            recv_ts_ns: wrist.recv_ts_ns.max(landmarks.recv_ts_ns),
            recv_time_unix_ns: stamps.recv_time_unix_ns,
            source_ts_ns: stamps.source_ts_ns,
            wrist_recv_ts_ns: wrist.recv_ts_ns,
            landmarks_recv_ts_ns: landmarks.recv_ts_ns,
        })
    }

    /// Decode one raw line and push it.
    ///
    /// # Errors
    ///
    /// Returns the decode failure without touching assembler state.
    pub fn push_line(
        &mut self,
        line: &str,
        recv_ts_ns: u64,
        stamps: FrameStamps,
    ) -> Result<Option<HandFrame>, DecodeError> {
        let packet = decode(line, recv_ts_ns)?;
        Ok(self.push_with(packet, stamps))
    }

    /// Assembly progress of `side`.
    pub fn state(&self, side: HandSide) -> AssemblyState {
        match &self.sides[side.index()] {
            None => AssemblyState::Empty,
            Some(state) => match (state.latest_wrist.is_some(), state.latest_landmarks.is_some()) {
                (true, true) => AssemblyState::Ready,
                (false, false) => AssemblyState::Empty,
                _ => AssemblyState::Partial,
            },
        }
    }

    /// Latest accepted wrist packet for `side`.
    pub fn latest_wrist(&self, side: HandSide) -> Option<&WristPacket> {
        self.sides[side.index()].as_ref()?.latest_wrist.as_ref()
    }

    /// Latest accepted landmarks packet for `side`.
    pub fn latest_landmarks(&self, side: HandSide) -> Option<&LandmarksPacket> {
        self.sides[side.index()].as_ref()?.latest_landmarks.as_ref()
    }

    /// Sequence id the next frame for `side` will carry.
    pub fn next_sequence_id(&self, side: HandSide) -> u64 {
        self.sides[side.index()].as_ref().map_or(0, |state| state.next_sequence_id)
    }
}
