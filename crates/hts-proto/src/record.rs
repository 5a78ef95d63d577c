//! Structured record encoding.
//!
//! Records are CBOR maps produced from the serde derives on each entity.
//! Field order follows declaration order, so equal values always encode to
//! equal bytes. Every field is kept, including absent optional timestamps
//! (encoded as CBOR null).

use serde::{Serialize, de::DeserializeOwned};

use crate::{
    errors::RecordError,
    frame::HandFrame,
    model::{LandmarksPacket, Packet, WristPacket},
};

/// Deterministic encode/decode pair for persistence and cross-process
/// hand-off.
pub trait Record: Serialize + DeserializeOwned {
    /// Encode into a CBOR record.
    fn to_record(&self) -> Result<Vec<u8>, RecordError> {
        let mut buf = Vec::new();
        ciborium::ser::into_writer(self, &mut buf)
            .map_err(|e| RecordError::Encode(e.to_string()))?;
        Ok(buf)
    }

    /// Decode from a CBOR record.
    fn from_record(bytes: &[u8]) -> Result<Self, RecordError> {
        ciborium::de::from_reader(bytes).map_err(|e| RecordError::Decode(e.to_string()))
    }
}

impl Record for WristPacket {}
impl Record for LandmarksPacket {}
impl Record for Packet {}
impl Record for HandFrame {}
