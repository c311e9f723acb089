use std::io;
use std::net::Ipv4Addr;

use oscpub::client::Client;
use oscpub::transport::{ManualClock, Transport};
use oscpub::{ClientConfig, Manager};

/// One datagram captured by [`RecordingTransport`]
#[derive(Debug, Clone)]
pub struct Sent {
    pub host: String,
    pub port: u16,
    pub multicast: bool,
    pub packet: Vec<u8>,
}

/// Transport that keeps every packet instead of sending it
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pub sent: Vec<Sent>,
}

impl Transport for RecordingTransport {
    fn send_to(&mut self, host: &str, port: u16, packet: &[u8]) -> io::Result<usize> {
        self.sent.push(Sent {
            host: host.to_string(),
            port,
            multicast: false,
            packet: packet.to_vec(),
        });
        Ok(packet.len())
    }

    fn send_multicast(
        &mut self,
        group: Ipv4Addr,
        port: u16,
        _interface: Ipv4Addr,
        packet: &[u8],
    ) -> io::Result<usize> {
        self.sent.push(Sent {
            host: group.to_string(),
            port,
            multicast: true,
            packet: packet.to_vec(),
        });
        Ok(packet.len())
    }

    fn local_port(&self) -> u16 {
        50000
    }
}

pub fn recording_manager() -> (Manager<RecordingTransport, ManualClock>, ManualClock) {
    let clock = ManualClock::new(0);
    let client = Client::with_transport(RecordingTransport::default(), ClientConfig::default());
    (Manager::new(client, clock.clone()), clock)
}
