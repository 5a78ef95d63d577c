//! JSON lines output.
//!
//! One object per event, tagged with `"type": "packet"` or `"type": "frame"`.
//! Packet objects also carry the kind tag from the data model.

use std::io::{self, Write};

use hts_client::StreamEvent;
use hts_core::convert::{convert_frame, convert_packet};
use hts_proto::{HandFrame, Packet};
use serde::Serialize;

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum OutputLine<'a> {
    Packet(&'a Packet),
    Frame(&'a HandFrame),
}

/// Writes stream events as newline-delimited JSON.
#[derive(Debug)]
pub struct JsonLines<W> {
    writer: W,
    right_handed: bool,
}

impl<W: Write> JsonLines<W> {
    /// Writer emitting Unity coordinates unchanged.
    pub fn new(writer: W) -> Self {
        Self { writer, right_handed: false }
    }

    /// Convert geometry to right-handed coordinates before writing.
    #[must_use]
    pub fn right_handed(mut self, enabled: bool) -> Self {
        self.right_handed = enabled;
        self
    }

    /// Write one event and flush.
    ///
    /// The writer is flushed after every line.
    pub fn write_event(&mut self, event: &StreamEvent) -> io::Result<()> {
        match (event, self.right_handed) {
            (StreamEvent::Packet(packet), false) => self.write_line(&OutputLine::Packet(packet)),
            (StreamEvent::Packet(packet), true) => {
                self.write_line(&OutputLine::Packet(&convert_packet(packet)))
            },
            (StreamEvent::Frame(frame), false) => self.write_line(&OutputLine::Frame(frame)),
            (StreamEvent::Frame(frame), true) => {
                self.write_line(&OutputLine::Frame(&convert_frame(frame)))
            },
        }
    }

    /// Underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_line(&mut self, line: &OutputLine<'_>) -> io::Result<()> {
        serde_json::to_writer(&mut self.writer, line)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }
}
