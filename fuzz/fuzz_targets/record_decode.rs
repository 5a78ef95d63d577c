//! Arbitrary bytes must fail cleanly as records, and any record that decodes
//! must re-encode to bytes that decode to the same value.

#![no_main]

use hts_proto::{HandFrame, Packet, Record};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(packet) = Packet::from_record(data) {
        let bytes = packet.to_record().expect("decoded packet re-encodes");
        let again = Packet::from_record(&bytes).expect("re-encoded packet decodes");
        assert_eq!(again.side(), packet.side());
        assert_eq!(again.recv_ts_ns(), packet.recv_ts_ns());
    }

    if let Ok(frame) = HandFrame::from_record(data) {
        let bytes = frame.to_record().expect("decoded frame re-encodes");
        let again = HandFrame::from_record(&bytes).expect("re-encoded frame decodes");
        assert_eq!(again.sequence_id, frame.sequence_id);
        assert_eq!(again.frame_id, frame.frame_id);
    }
});
