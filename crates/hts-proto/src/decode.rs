//! Line decoder.
//!
//! # Wire Format
//!
//! ```text
//! <Side> <kind>:, v1, v2, ..., vN
//! ```
//!
//! - `<Side>` is `Left` or `Right`, `<kind>` is `wrist` or `landmarks`.
//!   Both match ASCII case-insensitively with any inner spacing.
//! - The payload is comma separated. Empty chunks are skipped, which absorbs
//!   the leading `, ` the upstream source writes after the label.
//! - Wrist carries exactly 7 values (`x, y, z, qx, qy, qz, qw`), landmarks
//!   exactly 63 (21 `x, y, z` triples).

use crate::{
    errors::DecodeError,
    model::{HandLandmarks, HandSide, LandmarksPacket, Packet, PacketKind, WristPacket, WristPose},
};

/// Values in a wrist packet.
pub const WRIST_VALUE_COUNT: usize = 7;

/// Landmark points in a landmarks packet.
pub const LANDMARK_COUNT: usize = 21;

/// Values in a landmarks packet.
pub const LANDMARK_VALUE_COUNT: usize = LANDMARK_COUNT * 3;

/// Decode one line into a typed packet stamped with `recv_ts_ns`.
///
/// # Errors
///
/// Returns the first [`DecodeError`] rule the line violates. Label checks run
/// before payload checks, so a line with both a bad side and bad numbers
/// reports the side.
pub fn decode(line: &str, recv_ts_ns: u64) -> Result<Packet, DecodeError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(DecodeError::Empty);
    }

    let Some((label, payload)) = line.split_once(':') else {
        return Err(DecodeError::MissingSeparator);
    };

    let (side, kind) = parse_label(label)?;
    let values = parse_values(payload)?;

    match kind {
        PacketKind::Wrist => {
            let values: [f64; WRIST_VALUE_COUNT] =
                values.try_into().map_err(|values: Vec<f64>| DecodeError::WrongCount {
                    kind,
                    expected: WRIST_VALUE_COUNT,
                    actual: values.len(),
                })?;

            Ok(Packet::Wrist(WristPacket { side, pose: WristPose::from_values(values), recv_ts_ns }))
        },
        PacketKind::Landmarks => {
            let landmarks =
                HandLandmarks::from_flat(&values).ok_or(DecodeError::WrongCount {
                    kind,
                    expected: LANDMARK_VALUE_COUNT,
                    actual: values.len(),
                })?;

            Ok(Packet::Landmarks(LandmarksPacket { side, landmarks, recv_ts_ns }))
        },
    }
}

fn parse_label(label: &str) -> Result<(HandSide, PacketKind), DecodeError> {
    let mut tokens = label.split_whitespace();
    let (Some(side_token), Some(kind_token), None) = (tokens.next(), tokens.next(), tokens.next())
    else {
        return Err(DecodeError::InvalidLabel(label.trim().to_string()));
    };

    let side = HandSide::from_token(side_token)
        .ok_or_else(|| DecodeError::UnknownSide(side_token.to_string()))?;
    let kind = PacketKind::from_token(kind_token)
        .ok_or_else(|| DecodeError::UnknownKind(kind_token.to_string()))?;

    Ok((side, kind))
}

fn parse_values(payload: &str) -> Result<Vec<f64>, DecodeError> {
    payload
        .split(',')
        .map(str::trim)
        .filter(|chunk| !chunk.is_empty())
        .enumerate()
        .map(|(index, chunk)| match chunk.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(value),
            _ => Err(DecodeError::MalformedNumber { index, value: chunk.to_string() }),
        })
        .collect()
}
