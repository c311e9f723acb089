//! Client configuration

use std::net::Ipv4Addr;

use crate::registry::{frame_rate_to_interval_us, DEFAULT_INTERVAL_US};
use crate::transport::udp::DEFAULT_MULTICAST_TTL;

/// Client configuration options
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Local UDP port to send from (0 = ephemeral)
    pub local_port: u16,

    /// Interface used for multicast sends (None = transport's primary interface)
    pub multicast_interface: Option<Ipv4Addr>,

    /// Multicast TTL
    pub multicast_ttl: u32,

    /// Initial encoder buffer capacity
    pub buffer_capacity: usize,

    /// Interval given to elements created by `publish`
    pub default_interval_us: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            local_port: 0,
            multicast_interface: None,
            multicast_ttl: DEFAULT_MULTICAST_TTL,
            buffer_capacity: 1024,
            default_interval_us: DEFAULT_INTERVAL_US,
        }
    }
}

impl ClientConfig {
    /// Create a new config with the given local port
    pub fn with_local_port(port: u16) -> Self {
        Self {
            local_port: port,
            ..Default::default()
        }
    }

    /// Set the local port
    pub fn local_port(mut self, port: u16) -> Self {
        self.local_port = port;
        self
    }

    /// Pin multicast sends to an interface
    pub fn multicast_interface(mut self, iface: Ipv4Addr) -> Self {
        self.multicast_interface = Some(iface);
        self
    }

    pub fn multicast_ttl(mut self, ttl: u32) -> Self {
        self.multicast_ttl = ttl;
        self
    }

    pub fn buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }

    /// Set the default publish rate in updates per second
    ///
    /// Non-positive rates give the longest representable interval.
    pub fn default_frame_rate(mut self, fps: f32) -> Self {
        self.default_interval_us = frame_rate_to_interval_us(fps);
        self
    }

    /// Set the default publish interval in microseconds
    pub fn default_interval_us(mut self, us: u32) -> Self {
        self.default_interval_us = us;
        self
    }
}
