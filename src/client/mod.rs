//! High-level client API: configuration and the connection state machine.

mod config;
mod connection;

pub use config::*;
pub use connection::*;
