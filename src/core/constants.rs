//! Protocol constants for the sockline wire format and client defaults.

use std::time::Duration;

// =============================================================================
// FRAMING
// =============================================================================

/// Frame delimiter byte for line-framed packets (ASCII newline).
pub const LINE_DELIMITER: u8 = 10;

// =============================================================================
// CLIENT DEFAULTS
// =============================================================================

/// Default overall connect timeout across all reconnect attempts.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default capacity of the send and receive buffers, in bytes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;
