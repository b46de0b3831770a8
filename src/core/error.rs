//! Top-level error types for the sockline client.

use thiserror::Error;

use crate::transport::{ResolveError, TransportError};

/// Errors surfaced by the client API.
///
/// Connect-path failures (per-attempt timeouts, refused ports) are resolved
/// internally by retry and backoff and never appear here; callers observe
/// them through [`crate::client::Connection::state`]. Only terminal or
/// immediately-local conditions become errors.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Invalid construction input, e.g. an empty candidate port list.
    #[error("configuration error: {0}")]
    Config(String),

    /// The target host could not be resolved to an address.
    #[error("address resolution failed: {0}")]
    Resolve(#[from] ResolveError),

    /// Operation requires an established connection.
    #[error("not connected")]
    NotConnected,

    /// The connection has failed permanently; no candidate port remains
    /// or the overall connect deadline elapsed.
    #[error("connection failed permanently")]
    ConnectionFailed,

    /// Transport-layer error (framing, buffering, socket).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),
}
