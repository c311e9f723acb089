//! Open Sound Control client with rate-limited value publishing
//!
//! Build [`Message`](osc::Message)s, encode them to OSC 1.0 binary (plain or
//! bundled), and send them over UDP. On top of that, a [`Manager`] keeps a
//! registry of value sources bound to destinations and re-sends each one
//! whenever its refresh interval has elapsed.
//!
//! ```no_run
//! use oscpub::{ClientConfig, Manager};
//!
//! # fn main() -> oscpub::Result<()> {
//! let mut manager = Manager::bind(ClientConfig::default())?;
//!
//! // Send once
//! manager.send_with("127.0.0.1", 9000, "/hello", ("world", 1));
//!
//! // Send at 30 fps until unpublished
//! manager.publish("127.0.0.1", 9000, "/uptime", || std::process::id());
//! loop {
//!     manager.post();
//! #   break;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Everything is single-threaded and best-effort: no acknowledgement, no
//! retries, no connection state.

pub mod client;
pub mod error;
pub mod osc;
pub mod registry;
pub mod transport;

pub use client::{Client, ClientConfig, Manager};
pub use error::{DecodeError, Error, Result};
pub use osc::{Message, TimeTag, Value};
pub use registry::{Destination, Element, ElementRef, IntoSource, Source};
