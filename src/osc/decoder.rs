//! OSC 1.0 packet decoder
//!
//! Parses what [`Encoder`](super::encoder::Encoder) produces: single messages
//! and (possibly nested) bundles. Used to inspect outgoing packets; there is
//! no dispatch on address patterns.

use bytes::{Buf, Bytes};

use super::encoder::{blob_padding, string_padding, BUNDLE_TAG};
use super::message::Message;
use super::value::*;
use crate::error::DecodeError;

/// Maximum bundle nesting depth
const MAX_NESTING_DEPTH: usize = 16;

/// A decoded OSC packet
#[derive(Debug, Clone, PartialEq)]
pub enum Packet {
    Message(Message),
    Bundle(Bundle),
}

impl Packet {
    pub fn as_message(&self) -> Option<&Message> {
        match self {
            Packet::Message(m) => Some(m),
            Packet::Bundle(_) => None,
        }
    }

    pub fn as_bundle(&self) -> Option<&Bundle> {
        match self {
            Packet::Bundle(b) => Some(b),
            Packet::Message(_) => None,
        }
    }
}

/// A decoded bundle with its elements in wire order
#[derive(Debug, Clone, PartialEq)]
pub struct Bundle {
    pub time: TimeTag,
    pub content: Vec<Packet>,
}

/// OSC packet decoder
pub struct Decoder {
    depth: usize,
}

impl Decoder {
    pub fn new() -> Self {
        Self { depth: 0 }
    }

    /// Decode one packet occupying the whole buffer
    pub fn decode(&mut self, buf: &mut Bytes) -> Result<Packet, DecodeError> {
        if buf.starts_with(BUNDLE_TAG) {
            self.depth += 1;
            if self.depth > MAX_NESTING_DEPTH {
                return Err(DecodeError::NestingTooDeep);
            }
            let result = self.decode_bundle(buf);
            self.depth -= 1;
            result.map(Packet::Bundle)
        } else if buf.first() == Some(&b'/') {
            self.decode_message(buf).map(Packet::Message)
        } else if buf.is_empty() {
            Err(DecodeError::UnexpectedEof)
        } else {
            Err(DecodeError::InvalidAddress)
        }
    }

    fn decode_bundle(&mut self, buf: &mut Bytes) -> Result<Bundle, DecodeError> {
        buf.advance(BUNDLE_TAG.len());
        if buf.remaining() < 8 {
            return Err(DecodeError::UnexpectedEof);
        }
        let time = TimeTag::from_bits(buf.get_u64());

        let mut content = Vec::new();
        while buf.has_remaining() {
            if buf.remaining() < 4 {
                return Err(DecodeError::InvalidBundle);
            }
            let len = buf.get_u32() as usize;
            if len % 4 != 0 || buf.remaining() < len {
                return Err(DecodeError::InvalidBundle);
            }
            let mut element = buf.split_to(len);
            content.push(self.decode(&mut element)?);
        }

        Ok(Bundle { time, content })
    }

    fn decode_message(&mut self, buf: &mut Bytes) -> Result<Message, DecodeError> {
        let address = read_str(buf)?;
        let mut msg = Message::new(address);

        if !buf.has_remaining() {
            // Type tag string is optional in very old implementations
            return Ok(msg);
        }
        let tags = read_str(buf)?;
        let tags = tags
            .strip_prefix(',')
            .ok_or(DecodeError::MissingTypeTags)?;

        for tag in tags.bytes() {
            msg.push(read_value(tag, buf)?);
        }

        Ok(msg)
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new()
    }
}

fn read_value(tag: u8, buf: &mut Bytes) -> Result<Value, DecodeError> {
    let need = match tag {
        TAG_INT | TAG_FLOAT | TAG_CHAR | TAG_RGBA | TAG_MIDI | TAG_BLOB => 4,
        TAG_LONG | TAG_DOUBLE | TAG_TIME => 8,
        _ => 0,
    };
    if buf.remaining() < need {
        return Err(DecodeError::UnexpectedEof);
    }

    let value = match tag {
        TAG_INT => Value::Int(buf.get_i32()),
        TAG_LONG => Value::Long(buf.get_i64()),
        TAG_FLOAT => Value::Float(buf.get_f32()),
        TAG_DOUBLE => Value::Double(buf.get_f64()),
        TAG_STRING => Value::String(read_str(buf)?),
        TAG_SYMBOL => Value::Symbol(read_str(buf)?),
        TAG_CHAR => {
            let c = buf.get_u32();
            Value::Char(char::from_u32(c).ok_or(DecodeError::InvalidChar(c))?)
        }
        TAG_BLOB => {
            let len = buf.get_u32() as usize;
            let padded = len + blob_padding(len);
            if buf.remaining() < padded {
                return Err(DecodeError::UnexpectedEof);
            }
            let data = buf.split_to(len);
            buf.advance(padded - len);
            Value::Blob(data)
        }
        TAG_TRUE => Value::Bool(true),
        TAG_FALSE => Value::Bool(false),
        TAG_NIL => Value::Nil,
        TAG_INF => Value::Inf,
        TAG_TIME => Value::Time(TimeTag::from_bits(buf.get_u64())),
        TAG_RGBA => Value::Rgba(buf.get_u32()),
        TAG_MIDI => {
            let mut m = [0u8; 4];
            buf.copy_to_slice(&mut m);
            Value::Midi(m)
        }
        other => return Err(DecodeError::UnknownTypeTag(other)),
    };
    Ok(value)
}

/// Read a NUL-terminated, 4-byte padded string
fn read_str(buf: &mut Bytes) -> Result<String, DecodeError> {
    let len = buf
        .iter()
        .position(|&b| b == 0)
        .ok_or(DecodeError::UnexpectedEof)?;
    let padded = len + string_padding(len);
    if buf.remaining() < padded {
        return Err(DecodeError::UnexpectedEof);
    }

    let bytes = buf.split_to(len);
    buf.advance(padded - len);
    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8)
}

/// Convenience function to decode a packet
pub fn decode(data: &[u8]) -> Result<Packet, DecodeError> {
    let mut decoder = Decoder::new();
    let mut buf = Bytes::copy_from_slice(data);
    decoder.decode(&mut buf)
}

/// Convenience function to decode a packet that must be a single message
pub fn decode_message(data: &[u8]) -> Result<Message, DecodeError> {
    match decode(data)? {
        Packet::Message(m) => Ok(m),
        Packet::Bundle(_) => Err(DecodeError::InvalidAddress),
    }
}
