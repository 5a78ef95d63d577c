//! Typed packet model.
//!
//! All types are plain values: once decoded they are never mutated, and any
//! transformation (coordinate conversion, re-stamping) produces a new value.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decode::LANDMARK_COUNT;

/// One `(x, y, z)` landmark coordinate.
pub type Point3 = [f64; 3];

/// Logical side of a tracked hand.
///
/// The primary partition key for frame assembly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HandSide {
    /// Left hand
    Left,
    /// Right hand
    Right,
}

impl HandSide {
    /// Both sides, in index order.
    pub const ALL: [Self; 2] = [Self::Left, Self::Right];

    /// Stable index for fixed-size per-side tables.
    pub const fn index(self) -> usize {
        match self {
            Self::Left => 0,
            Self::Right => 1,
        }
    }

    /// Wire spelling of the side.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Left => "Left",
            Self::Right => "Right",
        }
    }

    /// Match a side token ignoring ASCII case.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("left") {
            Some(Self::Left)
        } else if token.eq_ignore_ascii_case("right") {
            Some(Self::Right)
        } else {
            None
        }
    }
}

impl fmt::Display for HandSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Packet data category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PacketKind {
    /// Wrist position and orientation
    Wrist,
    /// 21-point landmark set
    Landmarks,
}

impl PacketKind {
    /// Wire spelling of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::Landmarks => "landmarks",
        }
    }

    /// Match a kind token ignoring ASCII case.
    pub fn from_token(token: &str) -> Option<Self> {
        if token.eq_ignore_ascii_case("wrist") {
            Some(Self::Wrist)
        } else if token.eq_ignore_ascii_case("landmarks") {
            Some(Self::Landmarks)
        } else {
            None
        }
    }
}

impl fmt::Display for PacketKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cartesian wrist position and orientation quaternion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WristPose {
    /// Position X
    pub x: f64,
    /// Position Y
    pub y: f64,
    /// Position Z
    pub z: f64,
    /// Quaternion X
    pub qx: f64,
    /// Quaternion Y
    pub qy: f64,
    /// Quaternion Z
    pub qz: f64,
    /// Quaternion W
    pub qw: f64,
}

impl WristPose {
    /// Identity pose at the origin.
    pub const IDENTITY: Self = Self { x: 0.0, y: 0.0, z: 0.0, qx: 0.0, qy: 0.0, qz: 0.0, qw: 1.0 };

    /// Build from values in wire order `x, y, z, qx, qy, qz, qw`.
    pub const fn from_values(values: [f64; 7]) -> Self {
        let [x, y, z, qx, qy, qz, qw] = values;
        Self { x, y, z, qx, qy, qz, qw }
    }

    /// Values in wire order.
    pub const fn to_values(&self) -> [f64; 7] {
        [self.x, self.y, self.z, self.qx, self.qy, self.qz, self.qw]
    }

    /// Position component.
    pub const fn position(&self) -> Point3 {
        [self.x, self.y, self.z]
    }

    /// Orientation as `(qx, qy, qz, qw)`.
    pub const fn orientation(&self) -> [f64; 4] {
        [self.qx, self.qy, self.qz, self.qw]
    }
}

/// Ordered set of 21 hand landmarks.
///
/// Point order follows [`crate::JointName`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HandLandmarks {
    points: [Point3; LANDMARK_COUNT],
}

impl HandLandmarks {
    /// Wrap an ordered point set.
    pub const fn new(points: [Point3; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Group a flat `x, y, z, x, y, z, ...` slice into points.
    ///
    /// Returns `None` unless the slice holds exactly 63 values.
    pub fn from_flat(values: &[f64]) -> Option<Self> {
        if values.len() != LANDMARK_COUNT * 3 {
            return None;
        }

        let mut points = [[0.0; 3]; LANDMARK_COUNT];
        for (point, chunk) in points.iter_mut().zip(values.chunks_exact(3)) {
            point.copy_from_slice(chunk);
        }
        Some(Self { points })
    }

    /// All points in order.
    pub const fn points(&self) -> &[Point3; LANDMARK_COUNT] {
        &self.points
    }

    /// Point at `index`, if in range.
    pub fn get(&self, index: usize) -> Option<Point3> {
        self.points.get(index).copied()
    }

    /// Apply `f` to every point, producing a new landmark set.
    #[must_use]
    pub fn map_points(&self, f: impl Fn(Point3) -> Point3) -> Self {
        Self { points: self.points.map(f) }
    }
}

/// Decoded wrist packet for one hand side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WristPacket {
    /// Hand side
    pub side: HandSide,
    /// Wrist pose values
    pub pose: WristPose,
    /// Monotonic receive timestamp in nanoseconds
    pub recv_ts_ns: u64,
}

/// Decoded landmarks packet for one hand side.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandmarksPacket {
    /// Hand side
    pub side: HandSide,
    /// Ordered landmark points
    pub landmarks: HandLandmarks,
    /// Monotonic receive timestamp in nanoseconds
    pub recv_ts_ns: u64,
}

/// Any decoded packet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Packet {
    /// Wrist packet
    Wrist(WristPacket),
    /// Landmarks packet
    Landmarks(LandmarksPacket),
}

impl Packet {
    /// Hand side of the packet.
    pub const fn side(&self) -> HandSide {
        match self {
            Self::Wrist(packet) => packet.side,
            Self::Landmarks(packet) => packet.side,
        }
    }

    /// Packet kind.
    pub const fn kind(&self) -> PacketKind {
        match self {
            Self::Wrist(_) => PacketKind::Wrist,
            Self::Landmarks(_) => PacketKind::Landmarks,
        }
    }

    /// Monotonic receive timestamp in nanoseconds.
    pub const fn recv_ts_ns(&self) -> u64 {
        match self {
            Self::Wrist(packet) => packet.recv_ts_ns,
            Self::Landmarks(packet) => packet.recv_ts_ns,
        }
    }
}

impl From<WristPacket> for Packet {
    fn from(packet: WristPacket) -> Self {
        Self::Wrist(packet)
    }
}

impl From<LandmarksPacket> for Packet {
    fn from(packet: LandmarksPacket) -> Self {
        Self::Landmarks(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn side_index_is_stable() {
        assert_eq!(HandSide::Left.index(), 0);
        assert_eq!(HandSide::Right.index(), 1);
        assert_eq!(HandSide::ALL.map(HandSide::index), [0, 1]);
    }

    #[test]
    fn side_tokens_ignore_case() {
        assert_eq!(HandSide::from_token("Left"), Some(HandSide::Left));
        assert_eq!(HandSide::from_token("RIGHT"), Some(HandSide::Right));
        assert_eq!(HandSide::from_token("middle"), None);
    }

    #[test]
    fn landmarks_from_flat_groups_triples_in_order() {
        let values: Vec<f64> = (0..63).map(f64::from).collect();
        let landmarks = HandLandmarks::from_flat(&values).unwrap();

        assert_eq!(landmarks.points()[0], [0.0, 1.0, 2.0]);
        assert_eq!(landmarks.points()[20], [60.0, 61.0, 62.0]);
        assert!(HandLandmarks::from_flat(&values[..62]).is_none());
    }

    #[test]
    fn wrist_pose_values_roundtrip_in_wire_order() {
        let values = [0.1, 0.2, 0.3, 0.0, 0.0, 0.0, 1.0];
        let pose = WristPose::from_values(values);

        assert_eq!(pose.position(), [0.1, 0.2, 0.3]);
        assert_eq!(pose.orientation(), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(pose.to_values(), values);
    }
}
