//! Unity left-handed to right-handed conversions.
//!
//! HTS streams Unity coordinates (left-handed, Y up). Right-handed consumers
//! flip the Y axis. Positions negate `y`; orientations are conjugated by the
//! reflection `S = diag(1, -1, 1)`, which for a unit quaternion reduces to
//! negating the `x` and `z` components.
//!
//! Every function returns a new value. Frame metadata (side, frame id,
//! sequence id, timestamps) is carried over unchanged.

use hts_proto::{HandFrame, HandLandmarks, LandmarksPacket, Packet, Point3, WristPacket, WristPose};

/// Convert one position.
pub const fn unity_left_to_right_position(x: f64, y: f64, z: f64) -> Point3 {
    [x, -y, z]
}

/// Convert one orientation, returned as `[qx, qy, qz, qw]`.
///
/// The result is normalized. A zero quaternion converts to identity.
pub fn unity_left_to_right_quaternion(qx: f64, qy: f64, qz: f64, qw: f64) -> [f64; 4] {
    let norm = (qx * qx + qy * qy + qz * qz + qw * qw).sqrt();
    if norm == 0.0 || !norm.is_finite() {
        return [0.0, 0.0, 0.0, 1.0];
    }
    [-qx / norm, qy / norm, -qz / norm, qw / norm]
}

/// Convert a wrist pose.
pub fn convert_wrist_pose(pose: &WristPose) -> WristPose {
    let [x, y, z] = unity_left_to_right_position(pose.x, pose.y, pose.z);
    let [qx, qy, qz, qw] = unity_left_to_right_quaternion(pose.qx, pose.qy, pose.qz, pose.qw);
    WristPose { x, y, z, qx, qy, qz, qw }
}

/// Convert every landmark, preserving point order.
pub fn convert_landmarks(landmarks: &HandLandmarks) -> HandLandmarks {
    landmarks.map_points(|[x, y, z]| unity_left_to_right_position(x, y, z))
}

/// Convert the geometry of a full frame.
pub fn convert_frame(frame: &HandFrame) -> HandFrame {
    HandFrame {
        wrist: convert_wrist_pose(&frame.wrist),
        landmarks: convert_landmarks(&frame.landmarks),
        ..frame.clone()
    }
}

/// Convert the geometry of a decoded packet.
pub fn convert_packet(packet: &Packet) -> Packet {
    match packet {
        Packet::Wrist(wrist) => {
            Packet::Wrist(WristPacket { pose: convert_wrist_pose(&wrist.pose), ..*wrist })
        },
        Packet::Landmarks(landmarks) => Packet::Landmarks(LandmarksPacket {
            landmarks: convert_landmarks(&landmarks.landmarks),
            ..*landmarks
        }),
    }
}
