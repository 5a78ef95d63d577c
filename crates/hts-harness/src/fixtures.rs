//! Protocol line fixtures.
//!
//! Lines are formatted the way the HTS app sends them: label, colon, then a
//! comma-led value list. Values use Rust's shortest round-trip formatting, so
//! decoding a fixture yields exactly the values it was built from.

use std::fmt::Write;

use hts_proto::{HandLandmarks, HandSide, WristPose};

/// Wrist line for `side` carrying `pose`.
pub fn wrist_line(side: HandSide, pose: &WristPose) -> String {
    let mut line = format!("{side} wrist:");
    for value in pose.to_values() {
        let _ = write!(line, ", {value}");
    }
    line
}

/// Landmarks line for `side` carrying `landmarks`.
pub fn landmarks_line(side: HandSide, landmarks: &HandLandmarks) -> String {
    let mut line = format!("{side} landmarks:");
    for value in landmarks.points().iter().flatten() {
        let _ = write!(line, ", {value}");
    }
    line
}

/// Non-trivial wrist pose.
pub fn sample_pose() -> WristPose {
    WristPose::from_values([0.12, -0.34, 0.56, 0.0, 0.7071, 0.0, 0.7071])
}

/// Landmarks whose `i`-th point is `[i * 0.01, i * 0.02, i * 0.03]`.
pub fn sample_landmarks() -> HandLandmarks {
    let mut points = [[0.0; 3]; 21];
    for (i, point) in points.iter_mut().enumerate() {
        let i = i as f64;
        *point = [i * 0.01, i * 0.02, i * 0.03];
    }
    HandLandmarks::new(points)
}

#[cfg(test)]
mod tests {
    use hts_proto::{Packet, decode};

    use super::*;

    #[test]
    fn wrist_fixture_decodes_to_its_pose() {
        let line = wrist_line(HandSide::Left, &sample_pose());
        assert!(line.starts_with("Left wrist:, 0.12, -0.34"));

        let Packet::Wrist(packet) = decode(&line, 1).unwrap() else {
            panic!("expected wrist packet");
        };
        assert_eq!(packet.pose, sample_pose());
    }

    #[test]
    fn landmarks_fixture_decodes_to_its_points() {
        let line = landmarks_line(HandSide::Right, &sample_landmarks());

        let Packet::Landmarks(packet) = decode(&line, 1).unwrap() else {
            panic!("expected landmarks packet");
        };
        assert_eq!(packet.landmarks, sample_landmarks());
    }
}
