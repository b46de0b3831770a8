//! Client configuration.

use std::time::Duration;

use crate::core::constants::{DEFAULT_BUFFER_CAPACITY, DEFAULT_CONNECT_TIMEOUT};

/// Packet framing mode for the byte stream.
///
/// Only delimiter-framed lines are implemented; fixed-size header framing
/// is a planned extension point, hence the non-exhaustive enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[non_exhaustive]
pub enum FrameMode {
    /// Newline-delimited frames decoded as UTF-8 text.
    #[default]
    Line,
}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Target host: an IP literal or a DNS name.
    pub host: String,

    /// Ordered candidate ports; must be non-empty to connect.
    pub ports: Vec<u16>,

    /// Packet framing mode.
    pub frame_mode: FrameMode,

    /// Overall deadline across all reconnect attempts combined.
    pub connect_timeout: Duration,

    /// Capacity of the send and receive buffers, in bytes.
    pub buffer_capacity: usize,
}

impl ClientConfig {
    /// Configuration for `host` with the given candidate ports and default
    /// timeout and buffer sizes.
    pub fn new(host: impl Into<String>, ports: Vec<u16>) -> Self {
        Self {
            host: host.into(),
            ports,
            frame_mode: FrameMode::Line,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
        }
    }
}

/// Builder for a [`ClientConfig`].
#[derive(Debug)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    /// Create a new builder targeting the loopback host with no ports.
    pub fn new() -> Self {
        Self {
            config: ClientConfig::new("127.0.0.1", Vec::new()),
        }
    }

    /// Set the target host.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Set the ordered candidate port list.
    pub fn ports(mut self, ports: impl Into<Vec<u16>>) -> Self {
        self.config.ports = ports.into();
        self
    }

    /// Set the packet framing mode.
    pub fn frame_mode(mut self, mode: FrameMode) -> Self {
        self.config.frame_mode = mode;
        self
    }

    /// Set the overall connect timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the send/receive buffer capacity.
    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.config.buffer_capacity = capacity;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ClientConfig {
        self.config
    }
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ClientConfig::new("example.org", vec![4567]);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.buffer_capacity, 4096);
        assert_eq!(config.frame_mode, FrameMode::Line);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfigBuilder::new()
            .host("10.0.0.1")
            .ports([4567, 4568])
            .connect_timeout(Duration::from_secs(5))
            .buffer_capacity(1024)
            .build();

        assert_eq!(config.host, "10.0.0.1");
        assert_eq!(config.ports, [4567, 4568]);
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.buffer_capacity, 1024);
    }
}
