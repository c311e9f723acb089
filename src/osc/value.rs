//! OSC argument types
//!
//! Every argument carried by an OSC message is one of these values. The
//! variant decides both the type tag character and the binary layout used
//! by the encoder.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;

// OSC type tags
pub const TAG_INT: u8 = b'i';
pub const TAG_LONG: u8 = b'h';
pub const TAG_FLOAT: u8 = b'f';
pub const TAG_DOUBLE: u8 = b'd';
pub const TAG_STRING: u8 = b's';
pub const TAG_SYMBOL: u8 = b'S';
pub const TAG_CHAR: u8 = b'c';
pub const TAG_BLOB: u8 = b'b';
pub const TAG_TRUE: u8 = b'T';
pub const TAG_FALSE: u8 = b'F';
pub const TAG_NIL: u8 = b'N';
pub const TAG_INF: u8 = b'I';
pub const TAG_TIME: u8 = b't';
pub const TAG_RGBA: u8 = b'r';
pub const TAG_MIDI: u8 = b'm';

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch
const NTP_UNIX_OFFSET: u64 = 2_208_988_800;

/// 64-bit OSC time tag
///
/// Upper 32 bits are seconds since 1900-01-01, lower 32 bits are the
/// fractional part of a second in units of 1/2^32.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeTag {
    pub seconds: u32,
    pub fraction: u32,
}

impl TimeTag {
    /// The special "execute immediately" time tag
    pub const IMMEDIATE: TimeTag = TimeTag {
        seconds: 0,
        fraction: 1,
    };

    pub fn new(seconds: u32, fraction: u32) -> Self {
        Self { seconds, fraction }
    }

    /// Time tag for the current wall-clock time
    pub fn now() -> Self {
        SystemTime::now().into()
    }

    /// Pack into the 64-bit wire representation
    pub fn to_bits(self) -> u64 {
        ((self.seconds as u64) << 32) | self.fraction as u64
    }

    /// Unpack from the 64-bit wire representation
    pub fn from_bits(bits: u64) -> Self {
        Self {
            seconds: (bits >> 32) as u32,
            fraction: bits as u32,
        }
    }

    pub fn is_immediate(&self) -> bool {
        *self == Self::IMMEDIATE
    }
}

impl Default for TimeTag {
    fn default() -> Self {
        Self::IMMEDIATE
    }
}

impl From<SystemTime> for TimeTag {
    fn from(t: SystemTime) -> Self {
        // Times before 1970 collapse to the epoch
        let since_unix = t.duration_since(UNIX_EPOCH).unwrap_or(Duration::ZERO);
        let seconds = since_unix.as_secs().wrapping_add(NTP_UNIX_OFFSET) as u32;
        let fraction = ((since_unix.subsec_nanos() as u64) << 32) / 1_000_000_000;
        Self {
            seconds,
            fraction: fraction as u32,
        }
    }
}

/// A single typed OSC argument
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// 32-bit big-endian two's complement integer (`i`)
    Int(i32),

    /// 64-bit big-endian two's complement integer (`h`)
    Long(i64),

    /// 32-bit IEEE 754 float (`f`)
    Float(f32),

    /// 64-bit IEEE 754 double (`d`)
    Double(f64),

    /// NUL-terminated ASCII string (`s`)
    String(String),

    /// Alternate string type for systems that distinguish symbols (`S`)
    Symbol(String),

    /// ASCII character sent as 32 bits (`c`)
    Char(char),

    /// Length-prefixed opaque bytes (`b`)
    Blob(Bytes),

    /// Boolean, encoded purely in the tag (`T` / `F`)
    Bool(bool),

    /// Nil (`N`), no payload
    Nil,

    /// Infinitum / impulse (`I`), no payload
    Inf,

    /// OSC time tag (`t`)
    Time(TimeTag),

    /// 32-bit RGBA color (`r`)
    Rgba(u32),

    /// MIDI message: port id, status, data1, data2 (`m`)
    Midi([u8; 4]),
}

impl Value {
    /// Type tag character for this value
    pub fn tag(&self) -> u8 {
        match self {
            Value::Int(_) => TAG_INT,
            Value::Long(_) => TAG_LONG,
            Value::Float(_) => TAG_FLOAT,
            Value::Double(_) => TAG_DOUBLE,
            Value::String(_) => TAG_STRING,
            Value::Symbol(_) => TAG_SYMBOL,
            Value::Char(_) => TAG_CHAR,
            Value::Blob(_) => TAG_BLOB,
            Value::Bool(true) => TAG_TRUE,
            Value::Bool(false) => TAG_FALSE,
            Value::Nil => TAG_NIL,
            Value::Inf => TAG_INF,
            Value::Time(_) => TAG_TIME,
            Value::Rgba(_) => TAG_RGBA,
            Value::Midi(_) => TAG_MIDI,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_long(&self) -> Option<i64> {
        match self {
            Value::Long(i) => Some(*i),
            Value::Int(i) => Some(*i as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f32> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(d) => Some(*d),
            Value::Float(f) => Some(*f as f64),
            _ => None,
        }
    }

    /// Try to get this value as a string reference (`s` or `S`)
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_blob(&self) -> Option<&[u8]> {
        match self {
            Value::Blob(b) => Some(b),
            _ => None,
        }
    }
}

macro_rules! impl_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v.into())
                }
            }
        )*
    };
}

impl_from! {
    i32 => Int,
    i16 => Int,
    i8 => Int,
    u16 => Int,
    u8 => Int,
    i64 => Long,
    u32 => Long,
    f32 => Float,
    f64 => Double,
    String => String,
    char => Char,
    bool => Bool,
    Bytes => Blob,
    Vec<u8> => Blob,
    TimeTag => Time,
    [u8; 4] => Midi,
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<&String> for Value {
    fn from(v: &String) -> Self {
        Value::String(v.clone())
    }
}

impl From<&[u8]> for Value {
    fn from(v: &[u8]) -> Self {
        Value::Blob(Bytes::copy_from_slice(v))
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Nil
    }
}
