//! Publish manager
//!
//! Owns a [`Client`] and the [`Registry`] of published elements. The host
//! calls [`Manager::post`] repeatedly (or awaits [`Manager::run`]); each
//! call makes one pass over the registry and sends every element whose
//! interval has elapsed:
//!
//! ```text
//!   idle ──(now - last_publish >= interval)──► due ──(encode + send)──► idle
//! ```
//!
//! Each due element goes out as its own datagram. Batching several values
//! into one packet is only available through the explicit bundle API.

use std::rc::Rc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::error::Result;
use crate::osc::{Message, TimeTag};
use crate::registry::{Destination, Element, ElementRef, IntoSource, Registry};
use crate::transport::{Clock, MonotonicClock, Transport, UdpTransport};

use super::config::ClientConfig;
use super::sender::Client;

/// Periodic publisher for registered value sources
///
/// Single-threaded: elements are `Rc<RefCell<_>>`, so the manager is
/// neither `Send` nor `Sync`.
///
/// # Example
/// ```no_run
/// use std::cell::Cell;
/// use std::rc::Rc;
///
/// use oscpub::client::{ClientConfig, Manager};
///
/// # fn example() -> oscpub::error::Result<()> {
/// let mut manager = Manager::bind(ClientConfig::default())?;
///
/// let level = Rc::new(Cell::new(0.0f32));
/// manager.publish("127.0.0.1", 9000, "/mixer/level", level.clone());
/// let handle = manager.publish("127.0.0.1", 9000, "/status", "ok");
/// handle.borrow_mut().set_interval_sec(1.0);
///
/// loop {
///     level.set(level.get() + 0.01);
///     manager.post();
/// #   break;
/// }
/// # Ok(())
/// # }
/// ```
pub struct Manager<T: Transport = UdpTransport, C: Clock = MonotonicClock> {
    client: Client<T>,
    registry: Registry,
    clock: C,
}

impl Manager<UdpTransport, MonotonicClock> {
    /// Bind a UDP client and use the monotonic clock
    pub fn bind(config: ClientConfig) -> Result<Self> {
        Ok(Self::new(Client::bind(config)?, MonotonicClock::new()))
    }
}

impl<T: Transport, C: Clock> Manager<T, C> {
    pub fn new(client: Client<T>, clock: C) -> Self {
        Self {
            client,
            registry: Registry::new(),
            clock,
        }
    }

    pub fn client(&self) -> &Client<T> {
        &self.client
    }

    pub fn client_mut(&mut self) -> &mut Client<T> {
        &mut self.client
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn local_port(&self) -> u16 {
        self.client.local_port()
    }

    /// Send one message immediately, bypassing the registry
    pub fn send(&mut self, host: &str, port: u16, msg: &Message) {
        self.client.send(host, port, msg);
    }

    pub fn send_with(&mut self, host: &str, port: u16, address: &str, args: impl IntoSource) {
        self.client.send_with(host, port, address, args);
    }

    pub fn begin_bundle(&mut self, time: TimeTag) {
        self.client.begin_bundle(time);
    }

    pub fn add_bundle(&mut self, msg: &Message) {
        self.client.add_bundle(msg);
    }

    pub fn add_bundle_with(&mut self, address: &str, args: impl IntoSource) {
        self.client.add_bundle_with(address, args);
    }

    pub fn end_bundle(&mut self) {
        self.client.end_bundle();
    }

    pub fn send_bundle(&mut self, host: &str, port: u16) {
        self.client.send_bundle(host, port);
    }

    /// Register `source` for periodic sending to `host:port` at `address`
    ///
    /// Replaces whatever was published to the same destination. The
    /// returned handle shares the element with the registry.
    pub fn publish(
        &mut self,
        host: &str,
        port: u16,
        address: &str,
        source: impl IntoSource,
    ) -> ElementRef {
        self.publish_to(Destination::new(host, port, address), source)
    }

    /// Like [`Manager::publish`], sending to a multicast group
    pub fn publish_multicast(
        &mut self,
        group: &str,
        port: u16,
        address: &str,
        source: impl IntoSource,
    ) -> ElementRef {
        self.publish_to(Destination::multicast(group, port, address), source)
    }

    pub fn publish_to(&mut self, dest: Destination, source: impl IntoSource) -> ElementRef {
        let element = Element::new(source)
            .with_interval_us(self.client.config().default_interval_us)
            .into_ref();

        match self.registry.insert(dest.clone(), Rc::clone(&element)) {
            Some(_) => tracing::debug!(destination = %dest, "Published element replaced"),
            None => tracing::debug!(
                destination = %dest,
                published = self.registry.len(),
                "Element published"
            ),
        }

        element
    }

    /// Handle to the element published at a unicast destination
    pub fn get_publish_element_ref(
        &self,
        host: &str,
        port: u16,
        address: &str,
    ) -> Option<ElementRef> {
        self.registry.get(&Destination::new(host, port, address))
    }

    pub fn get_publish_element_ref_multicast(
        &self,
        group: &str,
        port: u16,
        address: &str,
    ) -> Option<ElementRef> {
        self.registry.get(&Destination::multicast(group, port, address))
    }

    pub fn element(&self, dest: &Destination) -> Option<ElementRef> {
        self.registry.get(dest)
    }

    /// Stop publishing to `dest`
    pub fn unpublish(&mut self, dest: &Destination) -> Option<ElementRef> {
        let removed = self.registry.remove(dest);
        if removed.is_some() {
            tracing::debug!(destination = %dest, "Element unpublished");
        }
        removed
    }

    /// Send every element whose interval has elapsed
    ///
    /// Returns how many elements were sent.
    pub fn post(&mut self) -> usize {
        let now = self.clock.now_us();
        let mut sent = 0;

        for (dest, element) in self.registry.iter() {
            {
                let mut element = element.borrow_mut();
                if !element.is_due(now) {
                    continue;
                }
                element.mark_published(now);
            }
            // Shared borrow only, so sources may read their own handle
            self.client.send_element(dest, &element.borrow());
            sent += 1;
        }

        sent
    }

    /// Call [`Manager::post`] every `tick` forever
    ///
    /// Runs on the calling task; the future is not `Send`. Drop it (for
    /// example via `tokio::select!` or a timeout) to stop.
    pub async fn run(&mut self, tick: Duration) {
        let mut ticker = tokio::time::interval(tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            tick_us = tick.as_micros() as u64,
            published = self.registry.len(),
            "Publish loop started"
        );

        loop {
            ticker.tick().await;
            self.post();
        }
    }
}
