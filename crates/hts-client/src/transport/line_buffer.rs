//! Newline framing over a TCP byte stream.

use std::collections::VecDeque;

use bytes::BytesMut;

use super::ReadStamp;

/// Bytes requested per socket read.
const READ_CHUNK: usize = 8 * 1024;

/// Accumulates stream bytes and splits off complete lines.
///
/// Only the current partial line is retained. `scanned` remembers how far
/// the buffer has already been searched so each byte is inspected once.
///
/// `reads` holds one entry per socket read still in the buffer: the end
/// offset of its bytes and the stamp taken when it completed. A line is
/// stamped by the read that delivered its terminator.
#[derive(Debug)]
pub(crate) struct LineBuffer {
    buf: BytesMut,
    scanned: usize,
    reads: VecDeque<(usize, ReadStamp)>,
    max_line_bytes: usize,
}

impl LineBuffer {
    pub(crate) fn new(max_line_bytes: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(READ_CHUNK),
            scanned: 0,
            reads: VecDeque::new(),
            max_line_bytes,
        }
    }

    /// Attach `stamp` to the bytes appended since the previous read.
    pub(crate) fn record_read(&mut self, stamp: ReadStamp) {
        let end = self.buf.len();
        if self.reads.back().is_none_or(|&(last_end, _)| last_end < end) {
            self.reads.push_back((end, stamp));
        }
    }

    /// Split off the next complete line, without its terminator, together
    /// with the stamp of the read that completed it.
    pub(crate) fn next_line(&mut self) -> Option<(String, ReadStamp)> {
        let Some(offset) = self.buf[self.scanned..].iter().position(|&b| b == b'\n') else {
            self.scanned = self.buf.len();
            return None;
        };

        let end = self.scanned + offset + 1;
        let stamp = self
            .reads
            .iter()
            .find(|&&(read_end, _)| read_end >= end)
            .or(self.reads.back())
            .map(|&(_, stamp)| stamp)
            .unwrap_or_default();

        for (read_end, _) in &mut self.reads {
            *read_end = read_end.saturating_sub(end);
        }
        while self.reads.front().is_some_and(|&(read_end, _)| read_end == 0) {
            self.reads.pop_front();
        }

        let mut line = self.buf.split_to(end);
        self.scanned = 0;

        line.truncate(line.len() - 1);
        if line.last() == Some(&b'\r') {
            line.truncate(line.len() - 1);
        }
        Some((String::from_utf8_lossy(&line).into_owned(), stamp))
    }

    /// Whether the buffered partial line has reached the limit.
    pub(crate) fn is_overflowing(&self) -> bool {
        self.buf.len() >= self.max_line_bytes
    }

    /// Buffer to read into, with room for at least one chunk.
    pub(crate) fn read_target(&mut self) -> &mut BytesMut {
        self.buf.reserve(READ_CHUNK);
        &mut self.buf
    }

    /// Discard any partial line.
    pub(crate) fn clear(&mut self) {
        self.buf.clear();
        self.scanned = 0;
        self.reads.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) const fn max_line_bytes(&self) -> usize {
        self.max_line_bytes
    }
}
