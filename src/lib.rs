//! # Sockline
//!
//! A resilient line-framed TCP client. Sockline maintains one logical
//! connection to a service reachable through an ordered list of candidate
//! ports on a host, and keeps it alive:
//!
//! - **Failover**: ports that refuse a connection are removed permanently;
//!   the next candidate is tried in round-robin order
//! - **Backoff**: per-attempt connect timeouts grow exponentially, bounded
//!   by an overall connect deadline
//! - **Framing**: the byte stream is decoded into newline-delimited packets
//!   with bounded buffering of partial reads and partial writes
//! - **Cooperative**: the host drives everything by calling `tick()` at its
//!   own cadence; no call here ever blocks
//!
//! ## Modules
//!
//! - [`core`]: constants and the top-level error taxonomy
//! - [`transport`]: framing codec, backoff scheduler, buffered channel
//! - [`client`]: configuration and the connection state machine
//!
//! ## Example Usage
//!
//! ```no_run
//! use sockline::prelude::*;
//!
//! # async fn run() -> Result<(), ClientError> {
//! let config = ClientConfigBuilder::new()
//!     .host("127.0.0.1")
//!     .ports([4567, 4568, 4569])
//!     .build();
//!
//! let mut conn = Connection::new(config);
//! conn.connect()?;
//!
//! loop {
//!     conn.tick();
//!
//!     if conn.is_failed() {
//!         break;
//!     }
//!     if conn.is_connected() {
//!         for line in conn.poll() {
//!             println!("got line: {line}");
//!         }
//!     }
//!
//!     tokio::time::sleep(std::time::Duration::from_millis(100)).await;
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod client;
pub mod core;
pub mod transport;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::client::{
        ClientConfig, ClientConfigBuilder, Connection, ConnectionState, FrameMode,
    };
    pub use crate::core::ClientError;
    pub use crate::core::constants;
    pub use crate::transport::{
        AttemptCounters, BufferedChannel, LineDecoder, ResolveError, TransportError,
        TransportResult,
    };
}

// Re-export commonly used items at crate root
pub use self::client::{ClientConfig, ClientConfigBuilder, Connection, ConnectionState, FrameMode};
pub use self::core::ClientError;
pub use self::transport::{TransportError, TransportResult};
