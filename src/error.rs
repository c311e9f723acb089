//! Error types
//!
//! The send path is fire-and-forget and never returns these. They surface
//! from setup (binding a transport) and from packet decoding.

use std::fmt;
use std::io;

/// Result alias for fallible operations in this crate
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type
#[derive(Debug)]
pub enum Error {
    /// Socket setup failure
    Io(io::Error),
    /// Host string is not an IPv4 multicast group
    InvalidMulticastGroup(String),
    /// Malformed OSC packet
    Decode(DecodeError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "I/O error: {}", e),
            Error::InvalidMulticastGroup(host) => {
                write!(f, "Not an IPv4 multicast group: {}", host)
            }
            Error::Decode(e) => write!(f, "Decode error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            Error::Decode(e) => Some(e),
            Error::InvalidMulticastGroup(_) => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}

impl From<DecodeError> for Error {
    fn from(e: DecodeError) -> Self {
        Error::Decode(e)
    }
}

/// OSC packet decoding errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// Buffer ended in the middle of a field
    UnexpectedEof,
    /// Type tag string does not start with `,`
    MissingTypeTags,
    /// Unsupported type tag character
    UnknownTypeTag(u8),
    /// String field is not valid UTF-8
    InvalidUtf8,
    /// `c` argument is not a Unicode scalar value
    InvalidChar(u32),
    /// Bundle element length is misaligned or overruns the packet
    InvalidBundle,
    /// Packet is neither a bundle nor a message starting with `/`
    InvalidAddress,
    /// Bundles nested too deeply
    NestingTooDeep,
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodeError::UnexpectedEof => write!(f, "Unexpected end of packet"),
            DecodeError::MissingTypeTags => write!(f, "Missing type tag string"),
            DecodeError::UnknownTypeTag(t) => write!(f, "Unknown type tag: {:?}", *t as char),
            DecodeError::InvalidUtf8 => write!(f, "Invalid UTF-8 in string"),
            DecodeError::InvalidChar(c) => write!(f, "Invalid char code point: {:#x}", c),
            DecodeError::InvalidBundle => write!(f, "Invalid bundle element length"),
            DecodeError::InvalidAddress => write!(f, "Invalid address pattern"),
            DecodeError::NestingTooDeep => write!(f, "Bundle nesting too deep"),
        }
    }
}

impl std::error::Error for DecodeError {}
