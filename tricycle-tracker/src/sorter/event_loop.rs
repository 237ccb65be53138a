//! The task that owns all sorter state.
//!
//! Commands from the handle, location readings and fetch completions are
//! multiplexed with `tokio::select!`:
//! 1. Commands (highest priority; a closed channel ends the loop)
//! 2. Location readings and fetch results, in arrival order
//! 3. The refresh ticker, when enabled
//!
//! Fetches run on their own tasks and may overlap. Whichever result arrives
//! last replaces the stored sequence, even if it was dispatched first.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior};
use tricycle_core::{
    CollectionPoint, CollectionSource, FetchError, FetchPayload, FilterChange, FilterConfig,
    RankingQuery, SorterError, filter,
};

use super::config::SorterConfig;
use super::observer::{CollectionUpdate, FetchMetadata, UpdateOrigin};
use crate::location::{LocationProvider, LocationReading, LocationSink};
use crate::tracker::{PositionTracker, TrackerEvent};

/// Requests sent from the sorter handle.
#[derive(Debug)]
pub(super) enum Command {
    SetFilter(FilterChange),
    Stop,
}

#[derive(Debug)]
enum Event {
    Location(LocationReading),
    Fetched {
        seq: u64,
        outcome: Result<FetchPayload, FetchError>,
    },
}

pub(super) struct EventLoop<L> {
    config: SorterConfig,
    source: Arc<dyn CollectionSource>,
    tracker: PositionTracker<L>,
    events_tx: mpsc::UnboundedSender<Event>,
    events_rx: mpsc::UnboundedReceiver<Event>,
    snapshot: watch::Sender<Arc<[CollectionPoint]>>,
    collections: Arc<[CollectionPoint]>,
    filters: FilterConfig,
    ticker: Option<Interval>,
    fetch_seq: u64,
}

impl<L: LocationProvider> EventLoop<L> {
    pub(super) fn new(
        config: SorterConfig,
        source: Arc<dyn CollectionSource>,
        location: L,
        snapshot: watch::Sender<Arc<[CollectionPoint]>>,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut tracker = PositionTracker::new(location);
        if let Some(position) = config.initial_position {
            tracker.seed(position);
        }
        let filters = config.filters;
        Self {
            config,
            source,
            tracker,
            events_tx,
            events_rx,
            snapshot,
            collections: Arc::from(Vec::new()),
            filters,
            ticker: None,
            fetch_seq: 0,
        }
    }

    pub(super) async fn run(mut self, mut commands: mpsc::UnboundedReceiver<Command>) {
        self.begin();

        loop {
            tokio::select! {
                biased;

                command = commands.recv() => match command {
                    Some(Command::SetFilter(change)) => self.set_filter(change),
                    Some(Command::Stop) => self.stop(),
                    None => break,
                },

                Some(event) = self.events_rx.recv() => self.handle_event(event),

                () = next_tick(self.ticker.as_mut()) => {
                    log::debug!("refresh interval elapsed");
                    self.fetch();
                }
            }
        }

        self.stop();
        log::debug!("collection sorter stopped");
    }

    fn begin(&mut self) {
        if self.config.watch_position {
            let events = self.events_tx.clone();
            let sink = LocationSink::new(move |reading| {
                if events.send(Event::Location(reading)).is_err() {
                    log::debug!("collection sorter gone; dropping location reading");
                }
            });
            if let Err(error) = self.tracker.start(&self.config.watch_options, sink) {
                log::warn!("position tracking unavailable: {error}");
                self.config.observer.on_error(&error);
            }
        }

        self.fetch();

        let period = self.config.refresh_interval;
        if !period.is_zero() {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            self.ticker = Some(ticker);
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Location(reading) => match self.tracker.observe(reading) {
                Some(TrackerEvent::Moved(position)) => {
                    self.config.observer.on_position_change(&position);
                    self.fetch();
                }
                Some(TrackerEvent::Failed(error)) => {
                    log::warn!("location provider reported an error: {error}");
                    self.config.observer.on_error(&error);
                }
                None => {}
            },
            Event::Fetched {
                seq,
                outcome: Ok(payload),
            } => self.adopt(seq, payload),
            Event::Fetched {
                seq,
                outcome: Err(error),
            } => {
                log::warn!("fetch #{seq} failed: {error}");
                self.config.observer.on_error(&SorterError::from(error));
            }
        }
    }

    /// Dispatch a fetch for the current position on its own task.
    fn fetch(&mut self) {
        let Some(position) = self.tracker.position() else {
            log::info!("no position known yet; skipping collection fetch");
            return;
        };
        let query = RankingQuery::for_position(position).with_date(self.config.date.clone());
        self.fetch_seq = self.fetch_seq.wrapping_add(1);
        let seq = self.fetch_seq;
        log::debug!(
            "dispatching fetch #{seq} for ({}, {})",
            query.latitude,
            query.longitude
        );

        let source = Arc::clone(&self.source);
        let events = self.events_tx.clone();
        tokio::spawn(async move {
            let outcome = source.fetch(&query).await;
            if events.send(Event::Fetched { seq, outcome }).is_err() {
                log::debug!("collection sorter gone; discarding fetch #{seq}");
            }
        });
    }

    fn adopt(&mut self, seq: u64, payload: FetchPayload) {
        log::debug!(
            "fetch #{seq} returned {} collections",
            payload.collections.len()
        );
        self.collections = Arc::from(payload.collections);
        self.snapshot.send_replace(Arc::clone(&self.collections));
        self.publish(UpdateOrigin::Fetch(FetchMetadata {
            stats: payload.stats,
            user_position: payload.user_position,
            raw: payload.raw,
        }));
    }

    fn set_filter(&mut self, change: FilterChange) {
        self.filters.apply_change(change);
        self.publish(UpdateOrigin::Filter);
    }

    fn publish(&self, origin: UpdateOrigin) {
        let update = CollectionUpdate {
            collections: filter::apply(&self.collections, &self.filters),
            all_collections: Arc::clone(&self.collections),
            filters: self.filters,
            origin,
        };
        self.config.observer.on_update(&update);
    }

    fn stop(&mut self) {
        self.tracker.stop();
        self.ticker = None;
    }
}

async fn next_tick(ticker: Option<&mut Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => std::future::pending().await,
    }
}
