//! Publish registry
//!
//! Maps each [`Destination`] to the [`Element`] whose value is periodically
//! sent there. Elements are shared (`Rc<RefCell<_>>`) between the registry
//! and whoever published them, so callers can keep tuning the interval or
//! swap the source after registration.
//!
//! ```text
//!   Manager
//!   ┌──────────────────────────────┐
//!   │ Registry                     │
//!   │   Destination ─► ElementRef ─┼──► caller handle
//!   │   Destination ─► ElementRef  │
//!   └──────────────┬───────────────┘
//!                  │ post(): due?
//!                  ▼
//!        Element::encode_to(msg) ──► Client::send_element()
//! ```

pub mod destination;
pub mod element;
pub mod store;

pub use destination::Destination;
pub use element::{
    frame_rate_to_interval_us, Element, ElementRef, IntoSource, ReadValue, Source,
    DEFAULT_INTERVAL_US,
};
pub use store::Registry;
