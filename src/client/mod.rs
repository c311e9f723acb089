//! OSC client and publish manager
//!
//! - [`Client`] encodes and sends individual messages and bundles
//! - [`Manager`] owns a client plus the publish registry and re-sends
//!   registered values when their interval elapses

pub mod config;
pub mod manager;
pub mod sender;

pub use config::ClientConfig;
pub use manager::Manager;
pub use sender::{parse_multicast_group, Client};
