//! Published value sources
//!
//! An [`Element`] pairs a [`Source`] with the timing state the manager uses
//! to decide when to re-send it. The source decides what gets pushed into
//! the outgoing message:
//!
//! - `Shared`: reads an externally owned `Rc<Cell<T>>` / `Rc<RefCell<T>>`
//!   at send time, so later writes by the owner are picked up
//! - `Const`: a value captured once
//! - `Getter`: a closure called at send time
//! - `Tuple`: several sources concatenated into one multi-argument message
//!
//! [`IntoSource`] picks the variant from the argument type, so
//! `manager.publish(.., 42)`, `manager.publish(.., counter.clone())` and
//! `manager.publish(.., || read_sensor())` all resolve at compile time.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use bytes::Bytes;

use crate::osc::{Message, TimeTag, Value};

/// Default refresh interval: 30 updates per second
pub const DEFAULT_INTERVAL_US: u32 = 33_333;

/// Interval in microseconds for `fps` updates per second
///
/// Zero, negative and NaN rates map to `u32::MAX`.
pub fn frame_rate_to_interval_us(fps: f32) -> u32 {
    if fps > 0.0 {
        (1_000_000.0 / fps) as u32
    } else {
        u32::MAX
    }
}

/// Shared handle to a published element
pub type ElementRef = Rc<RefCell<Element>>;

/// Something that can be read as an OSC value on demand
pub trait ReadValue {
    fn read(&self) -> Value;
}

impl<T: Copy + Into<Value>> ReadValue for Cell<T> {
    fn read(&self) -> Value {
        self.get().into()
    }
}

impl<T: Clone + Into<Value>> ReadValue for RefCell<T> {
    fn read(&self) -> Value {
        self.borrow().clone().into()
    }
}

/// Where an element's arguments come from
pub enum Source {
    /// Externally owned value read at send time
    Shared(Rc<dyn ReadValue>),
    /// Value captured at construction
    Const(Value),
    /// Closure evaluated at send time
    Getter(Box<dyn Fn() -> Value>),
    /// Ordered composite, encoded in construction order
    Tuple(Vec<Source>),
}

impl Source {
    pub fn shared_cell<T>(cell: Rc<Cell<T>>) -> Self
    where
        T: Copy + Into<Value> + 'static,
    {
        Source::Shared(cell)
    }

    pub fn shared<T>(cell: Rc<RefCell<T>>) -> Self
    where
        T: Clone + Into<Value> + 'static,
    {
        Source::Shared(cell)
    }

    pub fn constant(value: impl Into<Value>) -> Self {
        Source::Const(value.into())
    }

    pub fn getter<F, R>(f: F) -> Self
    where
        F: Fn() -> R + 'static,
        R: Into<Value>,
    {
        Source::Getter(Box::new(move || f().into()))
    }

    pub fn tuple(sources: Vec<Source>) -> Self {
        Source::Tuple(sources)
    }

    /// Push this source's current arguments onto `msg`
    pub fn encode_to(&self, msg: &mut Message) {
        match self {
            Source::Shared(cell) => {
                msg.push(cell.read());
            }
            Source::Const(value) => {
                msg.push(value.clone());
            }
            Source::Getter(f) => {
                msg.push(f());
            }
            Source::Tuple(sources) => {
                for source in sources {
                    source.encode_to(msg);
                }
            }
        }
    }

    /// Number of arguments this source pushes
    pub fn arity(&self) -> usize {
        match self {
            Source::Tuple(sources) => sources.iter().map(Source::arity).sum(),
            _ => 1,
        }
    }
}

impl fmt::Debug for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Shared(_) => f.write_str("Shared"),
            Source::Const(v) => f.debug_tuple("Const").field(v).finish(),
            Source::Getter(_) => f.write_str("Getter"),
            Source::Tuple(sources) => f.debug_tuple("Tuple").field(sources).finish(),
        }
    }
}

/// Conversion into a [`Source`], selecting the variant by type
pub trait IntoSource {
    fn into_source(self) -> Source;
}

impl IntoSource for Source {
    fn into_source(self) -> Source {
        self
    }
}

macro_rules! impl_const_source {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoSource for $ty {
                fn into_source(self) -> Source {
                    Source::Const(self.into())
                }
            }
        )*
    };
}

impl_const_source!(
    Value, i8, i16, i32, i64, u8, u16, u32, f32, f64, bool, char, String, Bytes, Vec<u8>,
    TimeTag, [u8; 4], ()
);

impl IntoSource for &str {
    fn into_source(self) -> Source {
        Source::Const(self.into())
    }
}

impl<T> IntoSource for Rc<Cell<T>>
where
    T: Copy + Into<Value> + 'static,
{
    fn into_source(self) -> Source {
        Source::Shared(self)
    }
}

impl<T> IntoSource for Rc<RefCell<T>>
where
    T: Clone + Into<Value> + 'static,
{
    fn into_source(self) -> Source {
        Source::Shared(self)
    }
}

impl<F, R> IntoSource for F
where
    F: Fn() -> R + 'static,
    R: Into<Value>,
{
    fn into_source(self) -> Source {
        Source::getter(self)
    }
}

macro_rules! impl_tuple_source {
    ($($name:ident),+) => {
        impl<$($name: IntoSource),+> IntoSource for ($($name,)+) {
            #[allow(non_snake_case)]
            fn into_source(self) -> Source {
                let ($($name,)+) = self;
                Source::Tuple(vec![$($name.into_source()),+])
            }
        }
    };
}

impl_tuple_source!(A);
impl_tuple_source!(A, B);
impl_tuple_source!(A, B, C);
impl_tuple_source!(A, B, C, D);
impl_tuple_source!(A, B, C, D, E);
impl_tuple_source!(A, B, C, D, E, F);
impl_tuple_source!(A, B, C, D, E, F, G);
impl_tuple_source!(A, B, C, D, E, F, G, H);

/// A value source plus its publish schedule
#[derive(Debug)]
pub struct Element {
    /// Timestamp (µs, wrapping) of the last send; `None` until first sent
    last_publish_us: Option<u32>,
    interval_us: u32,
    source: Source,
}

impl Element {
    pub fn new(source: impl IntoSource) -> Self {
        Self {
            last_publish_us: None,
            interval_us: DEFAULT_INTERVAL_US,
            source: source.into_source(),
        }
    }

    /// Wrap into a shared handle
    pub fn into_ref(self) -> ElementRef {
        Rc::new(RefCell::new(self))
    }

    pub fn with_interval_us(mut self, us: u32) -> Self {
        self.interval_us = us;
        self
    }

    /// Set the interval as updates per second
    ///
    /// Non-positive rates saturate to the longest representable interval.
    pub fn set_frame_rate(&mut self, fps: f32) {
        self.interval_us = frame_rate_to_interval_us(fps);
    }

    pub fn set_interval_usec(&mut self, us: u32) {
        self.interval_us = us;
    }

    pub fn set_interval_msec(&mut self, ms: f32) {
        self.interval_us = (ms * 1_000.0) as u32;
    }

    pub fn set_interval_sec(&mut self, sec: f32) {
        self.interval_us = (sec * 1_000_000.0) as u32;
    }

    pub fn interval_us(&self) -> u32 {
        self.interval_us
    }

    pub fn last_publish_us(&self) -> Option<u32> {
        self.last_publish_us
    }

    /// Whether the interval has elapsed since the last send
    ///
    /// Uses wrapping subtraction so the answer stays correct when the
    /// microsecond counter rolls over.
    pub fn is_due(&self, now_us: u32) -> bool {
        match self.last_publish_us {
            None => true,
            Some(last) => now_us.wrapping_sub(last) >= self.interval_us,
        }
    }

    pub fn mark_published(&mut self, now_us: u32) {
        self.last_publish_us = Some(now_us);
    }

    pub fn source(&self) -> &Source {
        &self.source
    }

    /// Replace the value source, keeping the schedule
    pub fn set_source(&mut self, source: impl IntoSource) {
        self.source = source.into_source();
    }

    /// Push the current arguments onto `msg`
    pub fn encode_to(&self, msg: &mut Message) {
        self.source.encode_to(msg);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoded(source: impl IntoSource) -> Message {
        let mut msg = Message::new("/t");
        source.into_source().encode_to(&mut msg);
        msg
    }

    #[test]
    fn test_const_source() {
        let msg = encoded(42);
        assert_eq!(msg.args(), &[Value::Int(42)]);

        let msg = encoded("literal");
        assert_eq!(msg.args(), &[Value::String("literal".into())]);
    }

    #[test]
    fn test_shared_cell_reads_latest() {
        let value = Rc::new(Cell::new(1.0f32));
        let source = value.clone().into_source();
        assert!(matches!(source, Source::Shared(_)));

        value.set(2.5);
        let mut msg = Message::new("/t");
        source.encode_to(&mut msg);
        assert_eq!(msg.args(), &[Value::Float(2.5)]);
    }

    #[test]
    fn test_shared_refcell_string() {
        let name = Rc::new(RefCell::new(String::from("a")));
        let source = Source::shared(name.clone());
        name.borrow_mut().push('b');

        let mut msg = Message::new("/t");
        source.encode_to(&mut msg);
        assert_eq!(msg.args()[0].as_str(), Some("ab"));
    }

    #[test]
    fn test_getter_is_lazy() {
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();
        let source = (move || {
            counter.set(counter.get() + 1);
            counter.get()
        })
        .into_source();
        assert_eq!(calls.get(), 0);

        let mut msg = Message::new("/t");
        source.encode_to(&mut msg);
        source.encode_to(&mut msg);
        assert_eq!(calls.get(), 2);
        assert_eq!(msg.args(), &[Value::Int(1), Value::Int(2)]);
    }

    #[test]
    fn test_tuple_preserves_order() {
        let msg = encoded((3, 1.5f32));
        assert_eq!(msg.type_tags(), ",if");
        assert_eq!(msg.args(), &[Value::Int(3), Value::Float(1.5)]);
    }

    #[test]
    fn test_tuple_mixes_variants() {
        let shared = Rc::new(Cell::new(true));
        let source = ("name", shared.clone(), || 0.25f64, 7i64).into_source();
        assert_eq!(source.arity(), 4);

        shared.set(false);
        let mut msg = Message::new("/t");
        source.encode_to(&mut msg);
        assert_eq!(msg.type_tags(), ",sFdh");
    }

    #[test]
    fn test_nested_tuple_flattens() {
        let msg = encoded((1, (2, 3), 4));
        assert_eq!(msg.args().len(), 4);
        assert_eq!(msg.args()[3], Value::Int(4));
    }

    #[test]
    fn test_interval_setters() {
        let mut elem = Element::new(0);
        assert_eq!(elem.interval_us(), DEFAULT_INTERVAL_US);

        elem.set_frame_rate(10.0);
        assert_eq!(elem.interval_us(), 100_000);

        elem.set_frame_rate(-5.0);
        assert_eq!(elem.interval_us(), u32::MAX);
        elem.set_frame_rate(0.0);
        assert_eq!(elem.interval_us(), u32::MAX);
        elem.set_frame_rate(f32::NAN);
        assert_eq!(elem.interval_us(), u32::MAX);

        elem.set_interval_msec(2.5);
        assert_eq!(elem.interval_us(), 2_500);

        elem.set_interval_sec(1.5);
        assert_eq!(elem.interval_us(), 1_500_000);

        elem.set_interval_usec(7);
        assert_eq!(elem.interval_us(), 7);
    }

    #[test]
    fn test_first_pass_is_due() {
        let elem = Element::new(0).with_interval_us(1_000_000);
        assert!(elem.is_due(0));
        assert_eq!(elem.last_publish_us(), None);
    }

    #[test]
    fn test_due_after_interval() {
        let mut elem = Element::new(0).with_interval_us(1_000_000);
        elem.mark_published(0);

        for t in (0..1_000_000).step_by(50_000) {
            assert!(!elem.is_due(t), "t={}", t);
        }
        assert!(elem.is_due(1_000_000));
    }

    #[test]
    fn test_due_across_wraparound() {
        let mut elem = Element::new(0).with_interval_us(1_000);
        elem.mark_published(u32::MAX - 100);

        assert!(!elem.is_due(u32::MAX));
        assert!(!elem.is_due(500));
        assert!(elem.is_due(899));
        assert!(elem.is_due(5_000));
    }

    #[test]
    fn test_set_source_keeps_schedule() {
        let mut elem = Element::new(1).with_interval_us(10);
        elem.mark_published(5);
        elem.set_source("replaced");

        let mut msg = Message::new("/t");
        elem.encode_to(&mut msg);
        assert_eq!(msg.type_tags(), ",s");
        assert_eq!(elem.last_publish_us(), Some(5));
        assert_eq!(elem.interval_us(), 10);
    }
}
