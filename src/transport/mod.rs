//! Datagram transport and clock seams
//!
//! The client only needs to hand finished packets to something that can
//! put them on the wire, and the manager only needs a microsecond counter.
//! Both are traits so tests can substitute recording/manual versions.

pub mod clock;
pub mod udp;

use std::io;
use std::net::Ipv4Addr;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use udp::UdpTransport;

/// Best-effort datagram sender
pub trait Transport {
    /// Send one datagram to `host:port`
    fn send_to(&mut self, host: &str, port: u16, packet: &[u8]) -> io::Result<usize>;

    /// Send one datagram to a multicast group out of `interface`
    fn send_multicast(
        &mut self,
        group: Ipv4Addr,
        port: u16,
        interface: Ipv4Addr,
        packet: &[u8],
    ) -> io::Result<usize>;

    /// Local port the transport sends from
    fn local_port(&self) -> u16;

    /// Address of the interface used for multicast when none is configured
    fn primary_interface(&self) -> Ipv4Addr {
        Ipv4Addr::UNSPECIFIED
    }
}
