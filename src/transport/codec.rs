//! Line framing codec.
//!
//! Encodes outgoing payloads into newline-delimited frames and incrementally
//! reassembles incoming byte chunks into complete payloads. The decoder is
//! pure with respect to sockets: it only sees byte slices, so the framing
//! logic can be tested without any I/O.

use crate::core::constants::LINE_DELIMITER;

use super::error::{TransportError, TransportResult};

/// Encode one payload as a delimited frame.
///
/// Appends the delimiter byte after the payload. Payloads that already
/// contain the delimiter are rejected, since they would decode as more than
/// one frame on the receiving side.
pub fn encode_line(payload: &[u8]) -> TransportResult<Vec<u8>> {
    if payload.contains(&LINE_DELIMITER) {
        return Err(TransportError::DelimiterInPayload);
    }

    let mut frame = Vec::with_capacity(payload.len() + 1);
    frame.extend_from_slice(payload);
    frame.push(LINE_DELIMITER);
    Ok(frame)
}

/// Incremental decoder for newline-delimited frames.
///
/// Feed it raw byte chunks in arrival order; each delimiter closes out the
/// accumulated frame and emits it as UTF-8 text (lossy for invalid
/// sequences). Bytes of a not-yet-terminated frame are retained across
/// calls, bounded by the configured capacity.
#[derive(Debug)]
pub struct LineDecoder {
    /// Accumulated bytes of the current, unterminated frame.
    partial: Vec<u8>,
    /// Maximum number of payload bytes a single frame may accumulate.
    capacity: usize,
    /// Set while skipping the remainder of an oversized frame. Cleared at
    /// the next delimiter so decoding resynchronizes on the frame after it.
    discarding: bool,
}

impl LineDecoder {
    /// Create a decoder bounded by `capacity` payload bytes per frame.
    pub fn new(capacity: usize) -> Self {
        Self {
            partial: Vec::new(),
            capacity,
            discarding: false,
        }
    }

    /// Number of buffered bytes belonging to an unterminated frame.
    pub fn pending(&self) -> usize {
        self.partial.len()
    }

    /// Consume one received chunk, appending completed payloads to `out` in
    /// arrival order.
    ///
    /// The whole chunk is always consumed. If an unterminated frame grows
    /// past the capacity, its bytes are dropped, the decoder skips input
    /// until the next delimiter, and `FrameTooLarge` is returned after the
    /// chunk has been processed; frames on either side of the oversized one
    /// are unaffected. The reported length counts the bytes observed up to
    /// the end of the chunk, a lower bound when the frame spans further
    /// chunks.
    pub fn feed(&mut self, chunk: &[u8], out: &mut Vec<String>) -> TransportResult<()> {
        // Bytes observed of an oversized frame detected in this chunk.
        let mut oversized: Option<usize> = None;

        for &byte in chunk {
            if byte == LINE_DELIMITER {
                if self.discarding {
                    self.discarding = false;
                } else {
                    out.push(String::from_utf8_lossy(&self.partial).into_owned());
                }
                self.partial.clear();
            } else if self.discarding {
                // skip until the next delimiter
                if let Some(observed) = oversized.as_mut() {
                    *observed += 1;
                }
            } else if self.partial.len() == self.capacity {
                self.partial.clear();
                self.discarding = true;
                oversized = Some(self.capacity + 1);
            } else {
                self.partial.push(byte);
            }
        }

        if let Some(observed) = oversized {
            return Err(TransportError::FrameTooLarge {
                len: observed,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}
