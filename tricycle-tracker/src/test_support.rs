//! Test doubles for driving a sorter by hand.
//!
//! [`ManualLocationProvider`] hands readings to the tracker only when a test
//! pushes them through its [`ManualLocationHandle`]. [`RecordingObserver`]
//! forwards every notification into a channel the test can await.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::mpsc;
use tricycle_core::{LocationErrorCode, Position, SorterError};

use crate::location::{
    LocationProvider, LocationReading, LocationSink, LocationUnavailable, WatchId, WatchOptions,
};
use crate::sorter::{CollectionUpdate, SorterObserver};

#[derive(Debug, Default)]
struct ManualState {
    sink: Option<(WatchId, LocationSink)>,
    unavailable: Option<String>,
    watch_count: usize,
    last_options: Option<WatchOptions>,
    cleared: Vec<WatchId>,
}

fn lock(state: &Mutex<ManualState>) -> MutexGuard<'_, ManualState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Location provider driven by a test.
#[derive(Debug)]
pub struct ManualLocationProvider {
    state: Arc<Mutex<ManualState>>,
}

/// Test-side control of a [`ManualLocationProvider`].
#[derive(Debug, Clone)]
pub struct ManualLocationHandle {
    state: Arc<Mutex<ManualState>>,
}

impl ManualLocationProvider {
    /// A provider that accepts watches.
    #[must_use]
    pub fn new() -> (Self, ManualLocationHandle) {
        Self::with_state(ManualState::default())
    }

    /// A provider whose capability is missing.
    pub fn unavailable(reason: impl Into<String>) -> (Self, ManualLocationHandle) {
        Self::with_state(ManualState {
            unavailable: Some(reason.into()),
            ..ManualState::default()
        })
    }

    fn with_state(state: ManualState) -> (Self, ManualLocationHandle) {
        let shared = Arc::new(Mutex::new(state));
        (
            Self {
                state: Arc::clone(&shared),
            },
            ManualLocationHandle { state: shared },
        )
    }
}

impl LocationProvider for ManualLocationProvider {
    fn watch(
        &mut self,
        options: &WatchOptions,
        sink: LocationSink,
    ) -> Result<WatchId, LocationUnavailable> {
        let mut state = lock(&self.state);
        if let Some(reason) = &state.unavailable {
            return Err(LocationUnavailable::new(reason.clone()));
        }
        state.watch_count += 1;
        let id = WatchId(u64::try_from(state.watch_count).unwrap_or(u64::MAX));
        state.last_options = Some(*options);
        state.sink = Some((id, sink));
        Ok(id)
    }

    fn clear_watch(&mut self, id: WatchId) {
        let mut state = lock(&self.state);
        if state.sink.as_ref().is_some_and(|(active, _)| *active == id) {
            state.sink = None;
        }
        state.cleared.push(id);
    }
}

impl ManualLocationHandle {
    /// Deliver a reading to the active watch.
    ///
    /// Returns `false` when no watch is active.
    pub fn deliver(&self, reading: LocationReading) -> bool {
        let sink = lock(&self.state).sink.as_ref().map(|(_, sink)| sink.clone());
        match sink {
            Some(sink) => {
                sink.deliver(reading);
                true
            }
            None => false,
        }
    }

    /// Deliver a position fix.
    pub fn report(&self, position: Position) -> bool {
        self.deliver(LocationReading::Fix(position))
    }

    /// Deliver a provider error.
    pub fn fail(&self, code: LocationErrorCode) -> bool {
        self.deliver(LocationReading::Failure(code))
    }

    /// Whether a watch is active.
    #[must_use]
    pub fn is_watching(&self) -> bool {
        lock(&self.state).sink.is_some()
    }

    /// Number of successful `watch` calls.
    #[must_use]
    pub fn watch_count(&self) -> usize {
        lock(&self.state).watch_count
    }

    /// Options passed to the most recent watch.
    #[must_use]
    pub fn last_options(&self) -> Option<WatchOptions> {
        lock(&self.state).last_options
    }

    /// Every id passed to `clear_watch`.
    #[must_use]
    pub fn cleared(&self) -> Vec<WatchId> {
        lock(&self.state).cleared.clone()
    }
}

/// A notification captured by [`RecordingObserver`].
#[derive(Debug, Clone, PartialEq)]
pub enum Observed {
    /// `on_update`.
    Update(CollectionUpdate),
    /// `on_error`.
    Error(SorterError),
    /// `on_position_change`.
    PositionChange(Position),
}

/// Observer forwarding every notification into a channel.
#[derive(Debug, Clone)]
pub struct RecordingObserver {
    tx: mpsc::UnboundedSender<Observed>,
}

/// Receiving side of a [`RecordingObserver`].
#[derive(Debug)]
pub struct ObservedEvents {
    rx: mpsc::UnboundedReceiver<Observed>,
}

impl RecordingObserver {
    /// Create an observer and the stream of what it sees.
    #[must_use]
    pub fn new() -> (Self, ObservedEvents) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, ObservedEvents { rx })
    }

    fn record(&self, observed: Observed) {
        if self.tx.send(observed).is_err() {
            log::debug!("observed events receiver dropped");
        }
    }
}

impl SorterObserver for RecordingObserver {
    fn on_update(&self, update: &CollectionUpdate) {
        self.record(Observed::Update(update.clone()));
    }

    fn on_error(&self, error: &SorterError) {
        self.record(Observed::Error(error.clone()));
    }

    fn on_position_change(&self, position: &Position) {
        self.record(Observed::PositionChange(*position));
    }
}

impl ObservedEvents {
    /// Wait for the next notification.
    pub async fn next(&mut self) -> Option<Observed> {
        self.rx.recv().await
    }

    /// Take every notification already delivered.
    pub fn drain(&mut self) -> Vec<Observed> {
        let mut drained = Vec::new();
        while let Ok(observed) = self.rx.try_recv() {
            drained.push(observed);
        }
        drained
    }
}
