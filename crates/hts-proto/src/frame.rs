//! Assembled per-hand frames.

use serde::{Deserialize, Serialize};

use crate::{
    joints::{FingerName, JointName},
    model::{HandLandmarks, HandSide, Point3, WristPose},
};

/// Coherent per-hand snapshot built from the latest wrist and landmarks
/// packets of one side.
///
/// Frames are immutable once emitted. Conversions build new frames and keep
/// the sequencing and timestamp fields intact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandFrame {
    /// Hand side
    pub side: HandSide,
    /// Frame identifier for downstream middleware (for example a ROS TF frame)
    pub frame_id: String,
    /// Wrist pose from the latest accepted wrist packet
    pub wrist: WristPose,
    /// Landmarks from the latest accepted landmarks packet
    pub landmarks: HandLandmarks,
    /// Per-side emission counter, starting at 0
    pub sequence_id: u64,
    /// Later of the two component receive timestamps
    pub recv_ts_ns: u64,
    /// Wall-clock receive time in Unix nanoseconds
    pub recv_time_unix_ns: Option<u64>,
    /// Upstream timestamp, passed through untouched
    pub source_ts_ns: Option<u64>,
    /// Receive timestamp of the wrist component
    pub wrist_recv_ts_ns: u64,
    /// Receive timestamp of the landmarks component
    pub landmarks_recv_ts_ns: u64,
}

impl HandFrame {
    /// Coordinates of one joint.
    pub fn joint(&self, joint: JointName) -> Point3 {
        self.landmarks.joint(joint)
    }

    /// Joints of one finger group with their coordinates.
    pub fn finger(&self, finger: FingerName) -> Vec<(JointName, Point3)> {
        self.landmarks.finger(finger)
    }
}
