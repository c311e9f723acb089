//! Publish a few live values to an OSC receiver
//!
//! Run with: cargo run --example publisher [HOST:PORT]
//!
//! Examples:
//!   cargo run --example publisher                    # sends to 127.0.0.1:9000
//!   cargo run --example publisher 192.168.1.20:8000  # sends to 192.168.1.20:8000
//!
//! Watch the traffic with any OSC monitor, e.g. `oscdump 9000`.
//!
//! Published addresses:
//!   /demo/phase    float, 60 updates/s, written by the main loop
//!   /demo/uptime   double seconds, computed at send time, 1 update/s
//!   /demo/status   string + int pair, 2 updates/s

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use oscpub::{ClientConfig, Manager};

const DEFAULT_TARGET: &str = "127.0.0.1:9000";

fn parse_target(arg: &str) -> Result<(String, u16), String> {
    let (host, port) = arg
        .rsplit_once(':')
        .ok_or_else(|| format!("Invalid target: '{}'. Expected HOST:PORT", arg))?;
    let port = port
        .parse::<u16>()
        .map_err(|_| format!("Invalid port in target: '{}'", arg))?;
    Ok((host.to_string(), port))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let arg = std::env::args().nth(1);
    let (host, port) = parse_target(arg.as_deref().unwrap_or(DEFAULT_TARGET))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("oscpub=debug".parse()?)
                .add_directive("publisher=debug".parse()?),
        )
        .init();

    let mut manager = Manager::bind(ClientConfig::default())?;
    println!(
        "Publishing to {}:{} from local port {}",
        host,
        port,
        manager.local_port()
    );

    let phase = Rc::new(Cell::new(0.0f32));
    manager
        .publish(&host, port, "/demo/phase", phase.clone())
        .borrow_mut()
        .set_frame_rate(60.0);

    let started = Instant::now();
    manager
        .publish(&host, port, "/demo/uptime", move || {
            started.elapsed().as_secs_f64()
        })
        .borrow_mut()
        .set_interval_sec(1.0);

    manager
        .publish(&host, port, "/demo/status", ("running", 1))
        .borrow_mut()
        .set_interval_msec(500.0);

    let mut ticker = tokio::time::interval(Duration::from_millis(1));
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                phase.set((phase.get() + 0.001) % 1.0);
                manager.post();
            }
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        }
    }

    Ok(())
}
