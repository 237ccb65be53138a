//! The geolocation capability consumed by the tracker.
//!
//! A [`LocationProvider`] owns the platform subscription and pushes readings
//! into a [`LocationSink`] whenever the device reports a fix or an error.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tricycle_core::{LocationErrorCode, Position};

/// Handle identifying an active subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// Subscription options forwarded to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    /// Prefer satellite fixes over network estimates.
    pub high_accuracy: bool,
    /// How long the provider may take to produce a fix.
    pub timeout: Duration,
    /// Oldest cached fix the provider may return; zero forces a fresh one.
    pub maximum_age: Duration,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout: Duration::from_secs(10),
            maximum_age: Duration::ZERO,
        }
    }
}

/// One asynchronous report from a provider.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LocationReading {
    /// A new device position.
    Fix(Position),
    /// The subscription reported an error; it stays active.
    Failure(LocationErrorCode),
}

/// Destination for provider readings.
///
/// Cloning is cheap; every clone delivers to the same receiver.
#[derive(Clone)]
pub struct LocationSink {
    deliver: Arc<dyn Fn(LocationReading) + Send + Sync>,
}

impl LocationSink {
    /// Wrap a delivery function.
    pub fn new(deliver: impl Fn(LocationReading) + Send + Sync + 'static) -> Self {
        Self {
            deliver: Arc::new(deliver),
        }
    }

    /// Deliver any reading.
    pub fn deliver(&self, reading: LocationReading) {
        (self.deliver)(reading);
    }

    /// Deliver a position fix.
    pub fn report(&self, position: Position) {
        self.deliver(LocationReading::Fix(position));
    }

    /// Deliver a subscription error.
    pub fn fail(&self, code: LocationErrorCode) {
        self.deliver(LocationReading::Failure(code));
    }
}

impl fmt::Debug for LocationSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocationSink").finish_non_exhaustive()
    }
}

/// The location capability is missing on this device.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct LocationUnavailable {
    /// Human-readable explanation.
    pub reason: String,
}

impl LocationUnavailable {
    /// Build the error from a reason.
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// A device geolocation service.
pub trait LocationProvider: Send {
    /// Start a continuous subscription delivering readings into `sink`.
    ///
    /// # Errors
    ///
    /// Returns [`LocationUnavailable`] when the capability is absent.
    fn watch(
        &mut self,
        options: &WatchOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationUnavailable>;

    /// Cancel a subscription. Unknown ids are ignored.
    fn clear_watch(&mut self, id: WatchId);
}

impl<L> LocationProvider for Box<L>
where
    L: LocationProvider + ?Sized,
{
    fn watch(
        &mut self,
        options: &WatchOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationUnavailable> {
        (**self).watch(options, sink)
    }

    fn clear_watch(&mut self, id: WatchId) {
        (**self).clear_watch(id);
    }
}

/// Provider for a stationary device.
///
/// Reports its position once, synchronously, each time a watch starts.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedLocationProvider {
    position: Position,
    next_id: u64,
}

impl FixedLocationProvider {
    /// Provider that always reports `position`.
    #[must_use]
    pub const fn new(position: Position) -> Self {
        Self {
            position,
            next_id: 1,
        }
    }
}

impl LocationProvider for FixedLocationProvider {
    fn watch(
        &mut self,
        _options: &WatchOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationUnavailable> {
        let id = WatchId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        sink.report(self.position);
        Ok(id)
    }

    fn clear_watch(&mut self, _id: WatchId) {}
}
