//! Buffered send/receive channel over a TCP stream.
//!
//! Owns the live socket plus one fixed-capacity send buffer and a bounded
//! receive-side decoder. Drives partial-write retry and partial-read
//! accumulation with non-blocking `try_write`/`try_read` calls, so the
//! owning state machine can pump it from a cooperative tick without ever
//! blocking.

use std::io;

use tokio::net::TcpStream;

use super::codec::{LineDecoder, encode_line};
use super::error::{TransportError, TransportResult};

/// Buffered framing channel over one live TCP stream.
///
/// Holds at most one outbound frame at a time; a new frame may not be
/// queued while bytes of the previous one remain unsent.
#[derive(Debug)]
pub struct BufferedChannel {
    /// The live socket, exclusively owned.
    stream: TcpStream,
    /// Framed bytes of the in-flight outbound frame.
    send_buf: Vec<u8>,
    /// Count of `send_buf` bytes already written to the socket.
    send_offset: usize,
    /// Capacity bound for both directions, in bytes.
    capacity: usize,
    /// Incremental reassembly of inbound frames.
    decoder: LineDecoder,
    /// Scratch region for `try_read`.
    read_chunk: Vec<u8>,
}

impl BufferedChannel {
    /// Wrap an established stream with `capacity`-byte buffers.
    pub fn new(stream: TcpStream, capacity: usize) -> Self {
        Self {
            stream,
            send_buf: Vec::with_capacity(capacity),
            send_offset: 0,
            capacity,
            decoder: LineDecoder::new(capacity),
            read_chunk: vec![0u8; capacity],
        }
    }

    /// Whether bytes of a previously queued frame are still unsent.
    pub fn has_pending_send(&self) -> bool {
        self.send_offset < self.send_buf.len()
    }

    /// Frame a payload, place it in the send buffer, and start flushing.
    ///
    /// Rejects the call with `SendInProgress` while a previous frame has
    /// unsent bytes, and with `FrameTooLarge` when the framed length
    /// exceeds the buffer capacity. Neither rejection corrupts the buffer.
    pub fn queue(&mut self, payload: &[u8]) -> TransportResult<()> {
        if self.has_pending_send() {
            return Err(TransportError::SendInProgress);
        }

        let frame = encode_line(payload)?;
        if frame.len() > self.capacity {
            return Err(TransportError::FrameTooLarge {
                len: frame.len(),
                capacity: self.capacity,
            });
        }

        self.send_buf.clear();
        self.send_buf.extend_from_slice(&frame);
        self.send_offset = 0;
        self.flush_send()
    }

    /// Write as much of the in-flight frame as the socket accepts.
    ///
    /// Resumes from the current offset; once the whole frame is flushed the
    /// buffer and offset reset to zero. Returns without error when the
    /// socket would block.
    pub fn flush_send(&mut self) -> TransportResult<()> {
        while self.has_pending_send() {
            match self.stream.try_write(&self.send_buf[self.send_offset..]) {
                Ok(0) => {
                    return Err(TransportError::ConnectionLost(
                        io::ErrorKind::WriteZero.into(),
                    ));
                }
                Ok(written) => self.send_offset += written,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(TransportError::ConnectionLost(e)),
            }
        }

        self.send_buf.clear();
        self.send_offset = 0;
        Ok(())
    }

    /// Read every chunk the socket has ready and append decoded payloads to
    /// `out` in arrival order.
    ///
    /// One read is issued at a time; the loop stops as soon as the socket
    /// would block. Peer close and read errors surface as `ConnectionLost`;
    /// an oversized inbound frame surfaces as `FrameTooLarge` after the
    /// decoder has resynchronized, and the stream stays usable.
    pub fn pump_receive(&mut self, out: &mut Vec<String>) -> TransportResult<()> {
        loop {
            match self.stream.try_read(&mut self.read_chunk) {
                Ok(0) => {
                    return Err(TransportError::ConnectionLost(
                        io::ErrorKind::UnexpectedEof.into(),
                    ));
                }
                Ok(received) => self.decoder.feed(&self.read_chunk[..received], out)?,
                Err(ref e) if e.kind() == io::ErrorKind::WouldBlock => return Ok(()),
                Err(e) => return Err(TransportError::ConnectionLost(e)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    async fn stream_pair() -> (TcpStream, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server, _) = listener.accept().await.unwrap();
        (client, server)
    }

    #[tokio::test]
    async fn test_queue_flushes_and_resets_offset() {
        let (client, mut server) = stream_pair().await;
        let mut channel = BufferedChannel::new(client, 64);

        channel.queue(b"hello").unwrap();
        assert!(!channel.has_pending_send());
        assert_eq!(channel.send_offset, 0);

        let mut received = [0u8; 6];
        server.read_exact(&mut received).await.unwrap();
        assert_eq!(&received, b"hello\n");
    }

    #[tokio::test]
    async fn test_queue_rejected_while_send_pending() {
        let (client, _server) = stream_pair().await;
        let mut channel = BufferedChannel::new(client, 64);

        // Simulate a partially flushed frame.
        channel.send_buf.extend_from_slice(b"stuck\n");
        channel.send_offset = 2;

        assert!(matches!(
            channel.queue(b"next"),
            Err(TransportError::SendInProgress)
        ));
    }

    #[tokio::test]
    async fn test_oversized_frame_rejected() {
        let (client, _server) = stream_pair().await;
        let mut channel = BufferedChannel::new(client, 8);

        // 8 payload bytes frame to 9 bytes, one over capacity.
        let result = channel.queue(b"12345678");
        assert!(matches!(
            result,
            Err(TransportError::FrameTooLarge {
                len: 9,
                capacity: 8
            })
        ));
        assert!(!channel.has_pending_send());
    }

    #[tokio::test]
    async fn test_pump_receive_decodes_lines() {
        let (client, mut server) = stream_pair().await;
        let mut channel = BufferedChannel::new(client, 64);

        server.write_all(b"ab\ncd\n").await.unwrap();

        channel.stream.readable().await.unwrap();
        let mut lines = Vec::new();
        channel.pump_receive(&mut lines).unwrap();
        assert_eq!(lines, ["ab", "cd"]);
    }

    #[tokio::test]
    async fn test_pump_receive_keeps_partial_frame() {
        let (client, mut server) = stream_pair().await;
        let mut channel = BufferedChannel::new(client, 64);

        server.write_all(b"ab").await.unwrap();
        channel.stream.readable().await.unwrap();
        let mut lines = Vec::new();
        channel.pump_receive(&mut lines).unwrap();
        assert!(lines.is_empty());

        server.write_all(b"\ncd\n").await.unwrap();
        channel.stream.readable().await.unwrap();
        channel.pump_receive(&mut lines).unwrap();
        assert_eq!(lines, ["ab", "cd"]);
    }

    #[tokio::test]
    async fn test_peer_close_surfaces_connection_lost() {
        let (client, server) = stream_pair().await;
        let mut channel = BufferedChannel::new(client, 64);

        drop(server);

        channel.stream.readable().await.unwrap();
        let mut lines = Vec::new();
        assert!(matches!(
            channel.pump_receive(&mut lines),
            Err(TransportError::ConnectionLost(_))
        ));
    }
}
