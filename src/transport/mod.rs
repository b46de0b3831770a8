//! Sockline transport layer.
//!
//! Everything between the raw TCP socket and the high-level client:
//!
//! - **Line framing**: [`encode_line`] and the incremental [`LineDecoder`]
//! - **Backoff scheduling**: [`AttemptCounters`], [`next_port`],
//!   [`attempt_timeout`]
//! - **Buffered I/O**: [`BufferedChannel`] with partial-write retry and
//!   partial-read accumulation
//! - **Address resolution**: [`resolve_host`]
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            Client Layer                 │
//! │   connection state machine, config      │
//! ├─────────────────────────────────────────┤
//! │          Transport Layer                │  ← This module
//! │   framing, backoff, buffered channel    │
//! ├─────────────────────────────────────────┤
//! │              TCP                        │
//! └─────────────────────────────────────────┘
//! ```

mod backoff;
mod channel;
mod codec;
mod error;
mod resolve;

pub use backoff::{AttemptCounters, attempt_timeout, next_port};
pub use channel::BufferedChannel;
pub use codec::{LineDecoder, encode_line};
pub use error::{TransportError, TransportResult};
pub use resolve::{ResolveError, resolve_host};
