//! Transport-layer error types.

use std::io;

use thiserror::Error;

/// Errors raised by the framing codec, backoff scheduler, and buffered
/// channel.
#[derive(Debug, Error)]
pub enum TransportError {
    /// A frame (or an unterminated partial frame) exceeds the buffer
    /// capacity.
    #[error("frame of {len} bytes exceeds buffer capacity of {capacity} bytes")]
    FrameTooLarge {
        /// Size of the offending frame, including the delimiter. For
        /// inbound frames this counts the bytes observed by the time the
        /// frame was dropped, a lower bound on its full size.
        len: usize,
        /// Configured buffer capacity.
        capacity: usize,
    },

    /// An outgoing payload contains the frame delimiter byte.
    #[error("payload contains the frame delimiter byte")]
    DelimiterInPayload,

    /// A previous frame is still being flushed; only one frame may be in
    /// flight at a time.
    #[error("a send is already in progress")]
    SendInProgress,

    /// The scheduler was asked to pick a port from an empty candidate list.
    #[error("no candidate ports remain")]
    NoCandidates,

    /// The socket reported an error (or the peer closed the stream) during
    /// a send or receive.
    #[error("connection lost: {0}")]
    ConnectionLost(#[source] io::Error),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
