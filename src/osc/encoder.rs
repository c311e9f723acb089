//! OSC 1.0 binary encoder
//!
//! Message layout:
//! ```text
//! <address>\0<pad to 4>
//! ,<type tags>\0<pad to 4>
//! <arguments in push order, big-endian>
//! ```
//!
//! Bundle layout:
//! ```text
//! #bundle\0
//! <time tag: u32 seconds, u32 fraction>
//! { <u32 element length> <element bytes> }*
//! ```
//!
//! The encoder owns a single reusable output buffer. It never touches the
//! network; callers hand [`Encoder::data`] to a transport. Call
//! [`Encoder::init`] before every new packet. Mixing bundle and plain
//! message calls without it produces garbage framing and is not detected.

use bytes::{BufMut, Bytes, BytesMut};

use super::message::Message;
use super::value::{TimeTag, Value};

/// Literal bundle marker, already NUL-terminated and 4-byte aligned
pub const BUNDLE_TAG: &[u8; 8] = b"#bundle\0";

/// Size of `#bundle\0` plus the time tag
pub const BUNDLE_HEADER_SIZE: usize = 16;

const DEFAULT_CAPACITY: usize = 1024;

/// Number of NUL bytes needed after `len` bytes of a string.
/// Strings always get at least one terminator.
pub(crate) fn string_padding(len: usize) -> usize {
    4 - (len % 4)
}

/// Number of padding bytes after `len` bytes of blob data
pub(crate) fn blob_padding(len: usize) -> usize {
    (4 - (len % 4)) % 4
}

/// Reusable OSC packet encoder
pub struct Encoder {
    buf: BytesMut,
    /// One entry per open bundle: the offset of its length slot when nested
    bundles: Vec<Option<usize>>,
}

impl Encoder {
    /// Create a new encoder
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create encoder with specific capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
            bundles: Vec::new(),
        }
    }

    /// Reset write position and bundle state
    pub fn init(&mut self) -> &mut Self {
        self.buf.clear();
        self.bundles.clear();
        self
    }

    /// Encoded bytes so far
    pub fn data(&self) -> &[u8] {
        &self.buf
    }

    /// Get current encoded length
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Check if encoder is empty
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Whether a bundle is currently open
    pub fn in_bundle(&self) -> bool {
        !self.bundles.is_empty()
    }

    /// Take the encoded bytes and reset the encoder
    pub fn finish(&mut self) -> Bytes {
        self.bundles.clear();
        self.buf.split().freeze()
    }

    /// Encode a message
    ///
    /// Inside a bundle the message is prefixed with its length.
    pub fn encode(&mut self, msg: &Message) -> &mut Self {
        if self.in_bundle() {
            let slot = self.reserve_len();
            self.write_message(msg);
            self.patch_len(slot);
        } else {
            self.write_message(msg);
        }
        self
    }

    /// Open a bundle with the given time tag
    ///
    /// Opening a bundle while another is open nests it as a bundle element.
    pub fn begin_bundle(&mut self, time: TimeTag) -> &mut Self {
        let slot = if self.in_bundle() {
            Some(self.reserve_len())
        } else {
            None
        };
        self.bundles.push(slot);
        self.buf.put_slice(BUNDLE_TAG);
        self.buf.put_u64(time.to_bits());
        self
    }

    /// Close the innermost open bundle
    pub fn end_bundle(&mut self) -> &mut Self {
        if let Some(Some(slot)) = self.bundles.pop() {
            self.patch_len(slot);
        }
        self
    }

    fn reserve_len(&mut self) -> usize {
        let slot = self.buf.len();
        self.buf.put_u32(0);
        slot
    }

    fn patch_len(&mut self, slot: usize) {
        let len = (self.buf.len() - slot - 4) as u32;
        self.buf[slot..slot + 4].copy_from_slice(&len.to_be_bytes());
    }

    fn write_message(&mut self, msg: &Message) {
        self.write_str(msg.address());

        self.buf.put_u8(b',');
        for arg in msg.args() {
            self.buf.put_u8(arg.tag());
        }
        self.buf.put_bytes(0, string_padding(msg.args().len() + 1));

        for arg in msg.args() {
            self.write_value(arg);
        }
    }

    fn write_value(&mut self, value: &Value) {
        match value {
            Value::Int(i) => self.buf.put_i32(*i),
            Value::Long(i) => self.buf.put_i64(*i),
            Value::Float(f) => self.buf.put_f32(*f),
            Value::Double(d) => self.buf.put_f64(*d),
            Value::String(s) | Value::Symbol(s) => self.write_str(s),
            Value::Char(c) => self.buf.put_u32(*c as u32),
            Value::Blob(b) => {
                self.buf.put_u32(b.len() as u32);
                self.buf.put_slice(b);
                self.buf.put_bytes(0, blob_padding(b.len()));
            }
            // Carried entirely in the type tag
            Value::Bool(_) | Value::Nil | Value::Inf => {}
            Value::Time(tt) => self.buf.put_u64(tt.to_bits()),
            Value::Rgba(c) => self.buf.put_u32(*c),
            Value::Midi(m) => self.buf.put_slice(m),
        }
    }

    /// Write NUL-terminated string padded to a 4-byte boundary
    ///
    /// An interior NUL ends the string; anything after it is dropped.
    fn write_str(&mut self, s: &str) {
        let bytes = s.as_bytes();
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        self.buf.put_slice(&bytes[..len]);
        self.buf.put_bytes(0, string_padding(len));
    }
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to encode a single message
pub fn encode_message(msg: &Message) -> Bytes {
    let mut encoder = Encoder::new();
    encoder.encode(msg);
    encoder.finish()
}
