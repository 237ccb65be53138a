//! Significant-change filter over a location subscription.

use tricycle_core::{Position, SorterError};

use crate::location::{LocationProvider, LocationReading, LocationSink, WatchId, WatchOptions};

/// Minimum movement, in kilometres, for a fix to count as a position change.
pub const SIGNIFICANT_CHANGE_KM: f64 = 0.05;

/// Outcome of observing a reading.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerEvent {
    /// The device moved past the threshold; the stored position was replaced.
    Moved(Position),
    /// The provider reported an error; the subscription remains active.
    Failed(SorterError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackerState {
    Idle,
    Watching(WatchId),
    Stopped,
}

/// Debounces provider fixes against a distance threshold.
///
/// The lifecycle is `Idle -> Watching -> Stopped`; a stopped tracker does not
/// restart. Readings that arrive while not watching are ignored.
#[derive(Debug)]
pub struct PositionTracker<L> {
    provider: L,
    state: TrackerState,
    threshold_km: f64,
    last_accepted: Option<Position>,
}

impl<L: LocationProvider> PositionTracker<L> {
    /// Tracker using the default 50 m threshold.
    pub const fn new(provider: L) -> Self {
        Self {
            provider,
            state: TrackerState::Idle,
            threshold_km: SIGNIFICANT_CHANGE_KM,
            last_accepted: None,
        }
    }

    /// Override the significance threshold.
    #[must_use]
    pub const fn with_threshold_km(mut self, threshold_km: f64) -> Self {
        self.threshold_km = threshold_km;
        self
    }

    /// Use `position` as the baseline until a fix replaces it.
    pub const fn seed(&mut self, position: Position) {
        self.last_accepted = Some(position);
    }

    /// Subscribe to the provider, delivering readings into `sink`.
    ///
    /// Calling `start` while already watching, or after [`Self::stop`], does
    /// nothing.
    ///
    /// # Errors
    ///
    /// Returns a geolocation [`SorterError`] when the capability is missing.
    /// The tracker stays idle and does not retry.
    pub fn start(&mut self, options: &WatchOptions, sink: LocationSink) -> Result<(), SorterError> {
        if self.state != TrackerState::Idle {
            log::debug!("position tracker already started; ignoring start");
            return Ok(());
        }
        let id = self
            .provider
            .watch(options, sink)
            .map_err(|err| SorterError::location_unavailable(err.reason))?;
        self.state = TrackerState::Watching(id);
        Ok(())
    }

    /// Process one provider reading.
    pub fn observe(&mut self, reading: LocationReading) -> Option<TrackerEvent> {
        if !self.is_watching() {
            log::debug!("ignoring location reading while not watching");
            return None;
        }
        match reading {
            LocationReading::Fix(position) => self.accept(position).map(TrackerEvent::Moved),
            LocationReading::Failure(code) => {
                Some(TrackerEvent::Failed(SorterError::location_failure(code)))
            }
        }
    }

    fn accept(&mut self, position: Position) -> Option<Position> {
        if let Some(previous) = &self.last_accepted {
            let moved_km = previous.distance_km_to(&position);
            if moved_km.is_nan() || moved_km <= self.threshold_km {
                log::debug!("dropping fix {moved_km:.4} km from the last accepted position");
                return None;
            }
        }
        self.last_accepted = Some(position);
        Some(position)
    }

    /// Cancel the subscription. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let TrackerState::Watching(id) = self.state {
            self.provider.clear_watch(id);
        }
        self.state = TrackerState::Stopped;
    }

    /// Last accepted position, if any.
    #[must_use]
    pub const fn position(&self) -> Option<&Position> {
        self.last_accepted.as_ref()
    }

    /// Whether a subscription is active.
    #[must_use]
    pub const fn is_watching(&self) -> bool {
        matches!(self.state, TrackerState::Watching(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ManualLocationHandle, ManualLocationProvider};
    use rstest::{fixture, rstest};
    use tricycle_core::{ErrorKind, LocationErrorCode};

    fn discard() -> LocationSink {
        LocationSink::new(|_| {})
    }

    #[fixture]
    fn watching() -> (PositionTracker<ManualLocationProvider>, ManualLocationHandle) {
        let (provider, handle) = ManualLocationProvider::new();
        let mut tracker = PositionTracker::new(provider);
        tracker
            .start(&WatchOptions::default(), discard())
            .expect("watch should start");
        (tracker, handle)
    }

    // 0.0005 degrees of latitude is roughly 56 m; 0.0003 roughly 33 m.
    const ORIGIN: Position = Position::new(5.3000, -4.0000);
    const NEAR: Position = Position::new(5.3003, -4.0000);
    const FAR: Position = Position::new(5.3005, -4.0000);

    #[rstest]
    fn first_fix_is_always_accepted(
        watching: (PositionTracker<ManualLocationProvider>, ManualLocationHandle),
    ) {
        let (mut tracker, _handle) = watching;
        let event = tracker.observe(LocationReading::Fix(ORIGIN));
        assert_eq!(event, Some(TrackerEvent::Moved(ORIGIN)));
        assert_eq!(tracker.position(), Some(&ORIGIN));
    }

    #[rstest]
    fn jitter_below_threshold_is_dropped(
        watching: (PositionTracker<ManualLocationProvider>, ManualLocationHandle),
    ) {
        let (mut tracker, _handle) = watching;
        let _first = tracker.observe(LocationReading::Fix(ORIGIN));

        assert_eq!(tracker.observe(LocationReading::Fix(NEAR)), None);
        assert_eq!(tracker.position(), Some(&ORIGIN));
    }

    #[rstest]
    fn movement_past_threshold_replaces_position(
        watching: (PositionTracker<ManualLocationProvider>, ManualLocationHandle),
    ) {
        let (mut tracker, _handle) = watching;
        let _first = tracker.observe(LocationReading::Fix(ORIGIN));

        assert_eq!(
            tracker.observe(LocationReading::Fix(FAR)),
            Some(TrackerEvent::Moved(FAR))
        );
        assert_eq!(tracker.position(), Some(&FAR));
    }

    #[rstest]
    fn small_steps_are_measured_from_last_accepted_fix(
        watching: (PositionTracker<ManualLocationProvider>, ManualLocationHandle),
    ) {
        let (mut tracker, _handle) = watching;
        let _first = tracker.observe(LocationReading::Fix(ORIGIN));

        assert_eq!(tracker.observe(LocationReading::Fix(NEAR)), None);
        let next = Position::new(5.3006, -4.0000);
        assert_eq!(
            tracker.observe(LocationReading::Fix(next)),
            Some(TrackerEvent::Moved(next))
        );
    }

    #[rstest]
    #[case(1.0, None)]
    #[case(0.999, Some(TrackerEvent::Moved(FAR)))]
    fn fixes_must_exceed_the_threshold(
        #[case] threshold_share: f64,
        #[case] expected: Option<TrackerEvent>,
    ) {
        let (provider, _handle) = ManualLocationProvider::new();
        let threshold_km = ORIGIN.distance_km_to(&FAR) * threshold_share;
        let mut tracker = PositionTracker::new(provider).with_threshold_km(threshold_km);
        tracker
            .start(&WatchOptions::default(), discard())
            .expect("watch should start");
        let _first = tracker.observe(LocationReading::Fix(ORIGIN));

        assert_eq!(tracker.observe(LocationReading::Fix(FAR)), expected);
    }

    #[rstest]
    #[case(1, LocationErrorCode::PermissionDenied)]
    #[case(2, LocationErrorCode::PositionUnavailable)]
    #[case(3, LocationErrorCode::Timeout)]
    fn failures_map_provider_codes(
        watching: (PositionTracker<ManualLocationProvider>, ManualLocationHandle),
        #[case] raw: u16,
        #[case] expected: LocationErrorCode,
    ) {
        let (mut tracker, _handle) = watching;
        let event = tracker.observe(LocationReading::Failure(LocationErrorCode::from_code(raw)));
        let Some(TrackerEvent::Failed(error)) = event else {
            panic!("expected a failure event, got {event:?}");
        };
        assert_eq!(error.kind(), ErrorKind::Geolocation);
        assert_eq!(error.code(), Some(expected));
        assert!(tracker.is_watching());
    }

    #[rstest]
    fn readings_before_start_are_ignored() {
        let (provider, _handle) = ManualLocationProvider::new();
        let mut tracker = PositionTracker::new(provider);
        assert_eq!(tracker.observe(LocationReading::Fix(ORIGIN)), None);
        assert!(tracker.position().is_none());
    }

    #[rstest]
    fn stop_is_idempotent_and_silences_readings(
        watching: (PositionTracker<ManualLocationProvider>, ManualLocationHandle),
    ) {
        let (mut tracker, handle) = watching;
        tracker.stop();
        tracker.stop();

        assert!(!tracker.is_watching());
        assert_eq!(handle.cleared().len(), 1);
        assert_eq!(tracker.observe(LocationReading::Fix(FAR)), None);
    }

    #[rstest]
    fn stopped_tracker_does_not_restart(
        watching: (PositionTracker<ManualLocationProvider>, ManualLocationHandle),
    ) {
        let (mut tracker, handle) = watching;
        tracker.stop();
        tracker
            .start(&WatchOptions::default(), discard())
            .expect("start after stop is a no-op");
        assert!(!tracker.is_watching());
        assert_eq!(handle.watch_count(), 1);
    }

    #[rstest]
    fn missing_capability_fails_start() {
        let (provider, _handle) = ManualLocationProvider::unavailable("geolocation is not supported");
        let mut tracker = PositionTracker::new(provider);

        let error = tracker
            .start(&WatchOptions::default(), discard())
            .expect_err("start should fail");

        assert_eq!(error.kind(), ErrorKind::Geolocation);
        assert_eq!(error.message(), "geolocation is not supported");
        assert!(error.code().is_none());
        assert!(!tracker.is_watching());
    }

    #[rstest]
    fn seeded_position_acts_as_baseline(
        watching: (PositionTracker<ManualLocationProvider>, ManualLocationHandle),
    ) {
        let (mut tracker, _handle) = watching;
        tracker.seed(ORIGIN);
        assert_eq!(tracker.observe(LocationReading::Fix(NEAR)), None);
    }

    #[rstest]
    fn custom_threshold_applies() {
        let (provider, _handle) = ManualLocationProvider::new();
        let mut tracker = PositionTracker::new(provider).with_threshold_km(0.01);
        tracker
            .start(&WatchOptions::default(), discard())
            .expect("watch should start");
        let _first = tracker.observe(LocationReading::Fix(ORIGIN));
        assert_eq!(
            tracker.observe(LocationReading::Fix(NEAR)),
            Some(TrackerEvent::Moved(NEAR))
        );
    }
}
