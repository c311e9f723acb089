//! UDP transport
//!
//! One socket bound to the configured local port, used for both unicast and
//! multicast sends. Multicast picks the outgoing interface per send with
//! `IP_MULTICAST_IF`.

use std::io;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs, UdpSocket};

use socket2::{Domain, Protocol, SockRef, Socket, Type};

use super::Transport;

/// Multicast TTL when none is configured (stay on the local subnet)
pub const DEFAULT_MULTICAST_TTL: u32 = 1;

/// UDP socket implementing [`Transport`]
#[derive(Debug)]
pub struct UdpTransport {
    socket: UdpSocket,
    /// Looked up once at bind time
    primary_interface: Ipv4Addr,
}

impl UdpTransport {
    /// Bind to `0.0.0.0:local_port` (0 picks an ephemeral port)
    pub fn bind(local_port: u16) -> io::Result<Self> {
        Self::bind_with_ttl(local_port, DEFAULT_MULTICAST_TTL)
    }

    /// Bind and set the multicast TTL
    pub fn bind_with_ttl(local_port: u16, multicast_ttl: u32) -> io::Result<Self> {
        let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
        socket.set_reuse_address(true)?;
        let addr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, local_port);
        socket.bind(&SocketAddr::V4(addr).into())?;
        socket.set_multicast_ttl_v4(multicast_ttl)?;

        let socket: UdpSocket = socket.into();
        let primary_interface = primary_interface_ip().unwrap_or(Ipv4Addr::UNSPECIFIED);
        tracing::debug!(
            local_port = socket.local_addr()?.port(),
            multicast_ttl = multicast_ttl,
            primary_interface = %primary_interface,
            "UDP transport bound"
        );

        Ok(Self {
            socket,
            primary_interface,
        })
    }

    /// Underlying socket
    pub fn socket(&self) -> &UdpSocket {
        &self.socket
    }
}

impl Transport for UdpTransport {
    fn send_to(&mut self, host: &str, port: u16, packet: &[u8]) -> io::Result<usize> {
        let addr = resolve_v4(host, port)?;
        self.socket.send_to(packet, addr)
    }

    fn send_multicast(
        &mut self,
        group: Ipv4Addr,
        port: u16,
        interface: Ipv4Addr,
        packet: &[u8],
    ) -> io::Result<usize> {
        SockRef::from(&self.socket).set_multicast_if_v4(&interface)?;
        self.socket.send_to(packet, SocketAddrV4::new(group, port))
    }

    fn local_port(&self) -> u16 {
        self.socket.local_addr().map(|a| a.port()).unwrap_or(0)
    }

    fn primary_interface(&self) -> Ipv4Addr {
        self.primary_interface
    }
}

/// First IPv4 address `host` resolves to
///
/// The socket is IPv4 only, so IPv6 results are skipped.
fn resolve_v4(host: &str, port: u16) -> io::Result<SocketAddr> {
    (host, port)
        .to_socket_addrs()?
        .find(SocketAddr::is_ipv4)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::AddrNotAvailable,
                format!("no IPv4 address for {}", host),
            )
        })
}

/// Address of the interface the OS routes outbound traffic through
///
/// Connecting a UDP socket sends nothing; it only asks the kernel to pick a
/// route, whose source address we then read back.
fn primary_interface_ip() -> io::Result<Ipv4Addr> {
    let probe = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0))?;
    probe.connect((Ipv4Addr::new(192, 0, 2, 1), 9))?;
    match probe.local_addr()? {
        SocketAddr::V4(addr) => Ok(*addr.ip()),
        SocketAddr::V6(_) => Ok(Ipv4Addr::UNSPECIFIED),
    }
}
