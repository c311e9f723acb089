//! OSC client
//!
//! Encodes messages into a reusable buffer and hands each finished packet to
//! the transport as one datagram. Sends are fire-and-forget: transport
//! failures are logged and dropped, nothing is retried or acknowledged.

use std::net::Ipv4Addr;

use crate::error::{Error, Result};
use crate::osc::{Encoder, Message, TimeTag};
use crate::registry::{Destination, Element, IntoSource};
use crate::transport::{Transport, UdpTransport};

use super::config::ClientConfig;

/// Parse `host` as an IPv4 multicast group
pub fn parse_multicast_group(host: &str) -> Result<Ipv4Addr> {
    host.parse::<Ipv4Addr>()
        .ok()
        .filter(Ipv4Addr::is_multicast)
        .ok_or_else(|| Error::InvalidMulticastGroup(host.to_string()))
}

/// OSC sender over a datagram transport
///
/// Holds the encoder and a scratch message; every send method takes
/// `&mut self`, so a send can never start while another is in flight.
///
/// # Example
/// ```no_run
/// use oscpub::client::{Client, ClientConfig};
/// use oscpub::osc::{Message, TimeTag};
///
/// # fn example() -> oscpub::error::Result<()> {
/// let mut client = Client::bind(ClientConfig::default())?;
///
/// client.send_with("127.0.0.1", 9000, "/synth/freq", (440, 0.5f32));
///
/// client.begin_bundle(TimeTag::now());
/// client.add_bundle_with("/synth/gate", true);
/// client.add_bundle(&Message::new("/synth/note").with(60));
/// client.end_bundle();
/// client.send_bundle("127.0.0.1", 9000);
/// # Ok(())
/// # }
/// ```
pub struct Client<T: Transport = UdpTransport> {
    transport: T,
    encoder: Encoder,
    msg: Message,
    config: ClientConfig,
}

impl Client<UdpTransport> {
    /// Bind a UDP socket on the configured local port
    pub fn bind(config: ClientConfig) -> Result<Self> {
        let transport = UdpTransport::bind_with_ttl(config.local_port, config.multicast_ttl)?;
        Ok(Self::with_transport(transport, config))
    }
}

impl<T: Transport> Client<T> {
    /// Create a client over an existing transport
    pub fn with_transport(transport: T, config: ClientConfig) -> Self {
        Self {
            transport,
            encoder: Encoder::with_capacity(config.buffer_capacity),
            msg: Message::default(),
            config,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Local port packets are sent from
    pub fn local_port(&self) -> u16 {
        self.transport.local_port()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Bytes currently held by the encoder (the last packet, or an open bundle)
    pub fn encoded(&self) -> &[u8] {
        self.encoder.data()
    }

    /// Encode `msg` and send it to `host:port`
    pub fn send(&mut self, host: &str, port: u16, msg: &Message) {
        self.encoder.init().encode(msg);
        self.flush(host, port);
    }

    /// Build a message from `address` and `args`, then send it
    ///
    /// `args` is anything [`IntoSource`] accepts; tuples become multiple
    /// arguments.
    pub fn send_with(&mut self, host: &str, port: u16, address: &str, args: impl IntoSource) {
        self.build(address, args);
        self.encoder.init().encode(&self.msg);
        self.flush(host, port);
    }

    /// Encode `msg` and send it to a multicast group
    pub fn send_multicast(&mut self, group: &str, port: u16, msg: &Message) {
        self.encoder.init().encode(msg);
        self.flush_multicast(group, port);
    }

    pub fn send_multicast_with(
        &mut self,
        group: &str,
        port: u16,
        address: &str,
        args: impl IntoSource,
    ) {
        self.build(address, args);
        self.encoder.init().encode(&self.msg);
        self.flush_multicast(group, port);
    }

    /// Encode an element's current value for `dest` and send it
    pub fn send_element(&mut self, dest: &Destination, element: &Element) {
        self.msg.init(dest.address());
        element.encode_to(&mut self.msg);
        self.encoder.init().encode(&self.msg);

        if dest.is_multicast() {
            self.flush_multicast(dest.host(), dest.port());
        } else {
            self.flush(dest.host(), dest.port());
        }
    }

    /// Start a new bundle, discarding anything previously encoded
    pub fn begin_bundle(&mut self, time: TimeTag) {
        self.encoder.init().begin_bundle(time);
    }

    /// Append a message to the open bundle
    pub fn add_bundle(&mut self, msg: &Message) {
        self.encoder.encode(msg);
    }

    /// Build a message and append it to the open bundle
    pub fn add_bundle_with(&mut self, address: &str, args: impl IntoSource) {
        self.build(address, args);
        self.encoder.encode(&self.msg);
    }

    /// Close the open bundle
    pub fn end_bundle(&mut self) {
        self.encoder.end_bundle();
    }

    /// Send the encoded bundle as one datagram
    pub fn send_bundle(&mut self, host: &str, port: u16) {
        self.flush(host, port);
    }

    pub fn send_bundle_multicast(&mut self, group: &str, port: u16) {
        self.flush_multicast(group, port);
    }

    fn build(&mut self, address: &str, args: impl IntoSource) {
        self.msg.init(address);
        args.into_source().encode_to(&mut self.msg);
    }

    fn flush(&mut self, host: &str, port: u16) {
        match self.transport.send_to(host, port, self.encoder.data()) {
            Ok(n) => {
                tracing::trace!(host = host, port = port, bytes = n, "OSC packet sent");
            }
            Err(e) => {
                tracing::warn!(host = host, port = port, error = %e, "OSC send failed");
            }
        }
    }

    fn flush_multicast(&mut self, group: &str, port: u16) {
        let group_addr = match parse_multicast_group(group) {
            Ok(addr) => addr,
            Err(e) => {
                tracing::warn!(port = port, error = %e, "OSC multicast send skipped");
                return;
            }
        };
        let interface = self
            .config
            .multicast_interface
            .unwrap_or_else(|| self.transport.primary_interface());

        tracing::trace!(
            group = %group_addr,
            port = port,
            interface = %interface,
            bytes = self.encoder.len(),
            "Sending OSC multicast packet"
        );

        let result = self
            .transport
            .send_multicast(group_addr, port, interface, self.encoder.data());
        if let Err(e) = result {
            tracing::warn!(
                group = %group_addr,
                port = port,
                error = %e,
                "OSC multicast send failed"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io;

    use super::*;
    use crate::osc::{decode, decode_message, Value, BUNDLE_HEADER_SIZE, BUNDLE_TAG};

    #[derive(Default)]
    struct Recorder {
        unicast: Vec<(String, u16, Vec<u8>)>,
        multicast: Vec<(Ipv4Addr, u16, Ipv4Addr, Vec<u8>)>,
        fail: bool,
    }

    impl Transport for Recorder {
        fn send_to(&mut self, host: &str, port: u16, packet: &[u8]) -> io::Result<usize> {
            if self.fail {
                return Err(io::Error::new(io::ErrorKind::Other, "unreachable"));
            }
            self.unicast.push((host.to_string(), port, packet.to_vec()));
            Ok(packet.len())
        }

        fn send_multicast(
            &mut self,
            group: Ipv4Addr,
            port: u16,
            interface: Ipv4Addr,
            packet: &[u8],
        ) -> io::Result<usize> {
            self.multicast.push((group, port, interface, packet.to_vec()));
            Ok(packet.len())
        }

        fn local_port(&self) -> u16 {
            4242
        }

        fn primary_interface(&self) -> Ipv4Addr {
            Ipv4Addr::new(10, 0, 0, 7)
        }
    }

    fn client() -> Client<Recorder> {
        Client::with_transport(Recorder::default(), ClientConfig::default())
    }

    #[test]
    fn test_send_message() {
        let mut client = client();
        client.send("127.0.0.1", 9000, &Message::new("/a").with(1));

        let (host, port, packet) = &client.transport().unicast[0];
        assert_eq!(host, "127.0.0.1");
        assert_eq!(*port, 9000);
        assert_eq!(decode_message(packet).unwrap().args(), &[Value::Int(1)]);
    }

    #[test]
    fn test_send_with_tuple() {
        let mut client = client();
        client.send_with("h", 1, "/pair", (3, 1.5f32));

        let msg = decode_message(&client.transport().unicast[0].2).unwrap();
        assert_eq!(msg.address(), "/pair");
        assert_eq!(msg.type_tags(), ",if");
    }

    #[test]
    fn test_send_multicast_uses_primary_interface() {
        let mut client = client();
        client.send_multicast_with("239.1.2.3", 7000, "/m", 5);

        let (group, port, iface, _) = &client.transport().multicast[0];
        assert_eq!(*group, Ipv4Addr::new(239, 1, 2, 3));
        assert_eq!(*port, 7000);
        assert_eq!(*iface, Ipv4Addr::new(10, 0, 0, 7));
    }

    #[test]
    fn test_configured_multicast_interface() {
        let iface = Ipv4Addr::new(192, 168, 0, 2);
        let config = ClientConfig::default().multicast_interface(iface);
        let mut client = Client::with_transport(Recorder::default(), config);
        client.send_multicast("239.0.0.1", 7000, &Message::new("/m"));

        assert_eq!(client.transport().multicast[0].2, iface);
    }

    #[test]
    fn test_multicast_to_unicast_host_is_dropped() {
        let mut client = client();
        client.send_multicast("10.0.0.1", 7000, &Message::new("/m"));

        assert!(client.transport().multicast.is_empty());
        assert!(client.transport().unicast.is_empty());
    }

    #[test]
    fn test_transport_failure_is_silent() {
        let mut client = client();
        client.transport_mut().fail = true;
        client.send_with("h", 1, "/a", 1);
        assert!(client.transport().unicast.is_empty());
    }

    #[test]
    fn test_send_element_follows_destination() {
        let mut client = client();
        let element = Element::new(("on", 1));

        client.send_element(&Destination::new("h", 1, "/u"), &element);
        client.send_element(&Destination::multicast("239.9.9.9", 2, "/m"), &element);

        let unicast = decode_message(&client.transport().unicast[0].2).unwrap();
        assert_eq!(unicast.address(), "/u");
        assert_eq!(unicast.type_tags(), ",si");

        let multicast = decode_message(&client.transport().multicast[0].3).unwrap();
        assert_eq!(multicast.address(), "/m");
    }

    #[test]
    fn test_bundle_send() {
        let mut client = client();
        let tt = TimeTag::new(100, 0);
        client.begin_bundle(tt);
        client.add_bundle_with("/one", 1);
        client.add_bundle(&Message::new("/two").with(2.0f32));
        client.end_bundle();
        client.send_bundle("h", 9);

        assert_eq!(client.transport().unicast.len(), 1);
        let packet = &client.transport().unicast[0].2;
        assert_eq!(&packet[..8], BUNDLE_TAG);
        assert_eq!(&packet[8..16], &tt.to_bits().to_be_bytes());

        let bundle = decode(packet).unwrap();
        let bundle = bundle.as_bundle().unwrap();
        assert_eq!(bundle.content.len(), 2);

        let sub_total: usize = bundle
            .content
            .iter()
            .map(|p| 4 + crate::osc::encode_message(p.as_message().unwrap()).len())
            .sum();
        assert_eq!(sub_total, packet.len() - BUNDLE_HEADER_SIZE);
    }

    #[test]
    fn test_send_after_bundle_starts_fresh() {
        let mut client = client();
        client.begin_bundle(TimeTag::IMMEDIATE);
        client.add_bundle_with("/x", 1);
        client.end_bundle();
        client.send("h", 1, &Message::new("/plain"));

        assert_eq!(client.encoded(), b"/plain\0\0,\0\0\0");
    }

    #[test]
    fn test_local_port_passthrough() {
        assert_eq!(client().local_port(), 4242);
    }

    #[test]
    fn test_parse_multicast_group() {
        assert!(parse_multicast_group("239.255.0.1").is_ok());
        assert!(matches!(
            parse_multicast_group("192.168.0.1"),
            Err(Error::InvalidMulticastGroup(_))
        ));
        assert!(parse_multicast_group("not-an-ip").is_err());
    }
}
