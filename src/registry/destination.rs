//! Publish target identity

use std::cmp::Ordering;
use std::fmt;

/// Where a published element is sent: host, port, OSC address and whether
/// the host is a multicast group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    host: String,
    port: u16,
    address: String,
    multicast: bool,
}

impl Destination {
    /// Create a unicast destination
    pub fn new(host: impl Into<String>, port: u16, address: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port,
            address: address.into(),
            multicast: false,
        }
    }

    /// Create a multicast destination
    pub fn multicast(host: impl Into<String>, port: u16, address: impl Into<String>) -> Self {
        Self {
            multicast: true,
            ..Self::new(host, port, address)
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn is_multicast(&self) -> bool {
        self.multicast
    }
}

// Host, then port, then address. The multicast flag breaks ties so the
// order agrees with equality.
impl Ord for Destination {
    fn cmp(&self, other: &Self) -> Ordering {
        self.host
            .cmp(&other.host)
            .then(self.port.cmp(&other.port))
            .then_with(|| self.address.cmp(&other.address))
            .then(self.multicast.cmp(&other.multicast))
    }
}

impl PartialOrd for Destination {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}{}", self.host, self.port, self.address)?;
        if self.multicast {
            f.write_str(" [mcast]")?;
        }
        Ok(())
    }
}
