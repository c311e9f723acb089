//! Send a timestamped OSC bundle
//!
//! Run with: cargo run --example bundle_sender [HOST] [PORT]
//!
//! Sends one bundle holding a note-on and a gate message, tagged to execute
//! 100ms from now, then a plain message outside any bundle.

use std::time::{Duration, SystemTime};

use oscpub::{Client, ClientConfig, Message, TimeTag};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);
    let host = args.next().unwrap_or_else(|| "127.0.0.1".to_string());
    let port: u16 = match args.next() {
        Some(p) => p.parse()?,
        None => 9000,
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oscpub=trace".parse()?),
        )
        .init();

    let mut client = Client::bind(ClientConfig::default())?;

    let at = TimeTag::from(SystemTime::now() + Duration::from_millis(100));
    client.begin_bundle(at);
    client.add_bundle_with("/synth/note", (60, 0.8f32));
    client.add_bundle(&Message::new("/synth/gate").with(true));
    client.end_bundle();
    println!("Bundle is {} bytes", client.encoded().len());
    client.send_bundle(&host, port);

    client.send_with(&host, port, "/synth/status", "bundle sent");

    Ok(())
}
