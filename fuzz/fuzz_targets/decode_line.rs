//! Decoder must never panic, and accepted packets hold only finite values
//! with the exact count for their kind.

#![no_main]

use hts_proto::{decode, Packet, LANDMARK_COUNT};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let line = String::from_utf8_lossy(data);

    let Ok(packet) = decode(&line, 7) else {
        return;
    };
    assert_eq!(packet.recv_ts_ns(), 7);

    match packet {
        Packet::Wrist(wrist) => {
            assert!(wrist.pose.to_values().iter().all(|v| v.is_finite()));
        },
        Packet::Landmarks(landmarks) => {
            let points = landmarks.landmarks.points();
            assert_eq!(points.len(), LANDMARK_COUNT);
            assert!(points.iter().flatten().all(|v| v.is_finite()));
        },
    }

    // Decoding is pure
    assert_eq!(decode(&line, 7).ok(), Some(packet));
});
