//! OSC 1.0 message model and binary codec
//!
//! [`Message`] is the in-memory form, [`Encoder`] turns messages into wire
//! bytes (optionally framed as bundles) and [`decode`] parses them back.

pub mod decoder;
pub mod encoder;
pub mod message;
pub mod value;

pub use decoder::{decode, decode_message, Bundle, Decoder, Packet};
pub use encoder::{encode_message, Encoder, BUNDLE_HEADER_SIZE, BUNDLE_TAG};
pub use message::Message;
pub use value::{TimeTag, Value};
