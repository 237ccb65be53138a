//! Watch command implementation for the Tricycle CLI.
//!
//! The command starts a sorter pinned to one position and writes every
//! notification to the output as a single JSON line.

use std::future::Future;
use std::io::Write;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tricycle_core::{FilterConfig, Position, RouteStats, SorterError};
use tricycle_data::DEFAULT_ENDPOINT;
use tricycle_tracker::{
    CollectionSorter, CollectionUpdate, DEFAULT_REFRESH_INTERVAL, FixedLocationProvider,
    SorterConfig, SorterObserver,
};

use crate::{
    ARG_WATCH_ACCURACY, ARG_WATCH_DATE, ARG_WATCH_ENDPOINT, ARG_WATCH_HIDE_COMPLETED,
    ARG_WATCH_LAT, ARG_WATCH_LON, ARG_WATCH_MAX_DISTANCE, ARG_WATCH_ONCE, ARG_WATCH_REFRESH_SECS,
    CliError, ENV_WATCH_LAT, ENV_WATCH_LON,
};

/// CLI arguments for the `watch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Rank collection points around a fixed position and stream \
                 position, update and error events as JSON lines. Options \
                 can come from CLI flags, configuration files, or \
                 environment variables.",
    about = "Stream collections ranked by distance from a position"
)]
#[ortho_config(prefix = "TRICYCLE")]
pub(crate) struct WatchArgs {
    /// Ranking endpoint URL.
    #[arg(long = ARG_WATCH_ENDPOINT, value_name = "url")]
    #[serde(default)]
    pub(crate) endpoint: Option<String>,
    /// Latitude of the device in decimal degrees.
    #[arg(long = ARG_WATCH_LAT, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lat: Option<f64>,
    /// Longitude of the device in decimal degrees.
    #[arg(long = ARG_WATCH_LON, value_name = "degrees", allow_negative_numbers = true)]
    #[serde(default)]
    pub(crate) lon: Option<f64>,
    /// Accuracy radius of the position in metres.
    #[arg(long = ARG_WATCH_ACCURACY, value_name = "metres")]
    #[serde(default)]
    pub(crate) accuracy: Option<f64>,
    /// Day to rank collections for, passed through to the server.
    #[arg(long = ARG_WATCH_DATE, value_name = "date")]
    #[serde(default)]
    pub(crate) date: Option<String>,
    /// Only print collections at most this many kilometres away.
    #[arg(long = ARG_WATCH_MAX_DISTANCE, value_name = "km")]
    #[serde(default)]
    pub(crate) max_distance: Option<f64>,
    /// Leave completed collections out of the printed view.
    #[arg(
        long = ARG_WATCH_HIDE_COMPLETED,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) hide_completed: Option<bool>,
    /// Seconds between periodic refreshes; 0 disables them.
    #[arg(long = ARG_WATCH_REFRESH_SECS, value_name = "secs")]
    #[serde(default)]
    pub(crate) refresh_secs: Option<u64>,
    /// Exit after the first update or error.
    #[arg(
        long = ARG_WATCH_ONCE,
        value_name = "bool",
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    #[serde(default)]
    pub(crate) once: Option<bool>,
}

impl WatchArgs {
    pub(crate) fn into_config(self) -> Result<WatchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        WatchConfig::try_from(merged)
    }
}

/// Resolved `watch` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WatchConfig {
    /// Ranking endpoint URL.
    pub(crate) endpoint: String,
    /// Position reported for the whole run.
    pub(crate) position: Position,
    /// Optional date forwarded with every fetch.
    pub(crate) date: Option<String>,
    /// Filters applied to printed updates.
    pub(crate) filters: FilterConfig,
    /// Cadence of periodic refreshes.
    pub(crate) refresh_interval: Duration,
    /// Stop after the first update or error.
    pub(crate) once: bool,
}

impl WatchConfig {
    pub(crate) fn sorter_config(&self) -> SorterConfig {
        SorterConfig::new(self.endpoint.clone())
            .with_refresh_interval(self.refresh_interval)
            .with_filters(self.filters)
            .with_date(self.date.clone())
    }
}

impl TryFrom<WatchArgs> for WatchConfig {
    type Error = CliError;

    fn try_from(args: WatchArgs) -> Result<Self, Self::Error> {
        let lat = args.lat.ok_or(CliError::MissingArgument {
            field: ARG_WATCH_LAT,
            env: ENV_WATCH_LAT,
        })?;
        let lon = args.lon.ok_or(CliError::MissingArgument {
            field: ARG_WATCH_LON,
            env: ENV_WATCH_LON,
        })?;

        let mut position = Position::new(lat, lon);
        if let Some(accuracy) = args.accuracy {
            position = position.with_accuracy(accuracy);
        }

        let refresh_interval = args
            .refresh_secs
            .map_or(DEFAULT_REFRESH_INTERVAL, Duration::from_secs);

        Ok(Self {
            endpoint: args.endpoint.unwrap_or_else(|| DEFAULT_ENDPOINT.to_owned()),
            position,
            date: args.date,
            filters: FilterConfig::new(args.max_distance, args.hide_completed.unwrap_or(false)),
            refresh_interval,
            once: args.once.unwrap_or(false),
        })
    }
}

/// A sorter notification as printed by the command.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum WatchEvent {
    Position(Position),
    Update(CollectionUpdate),
    Error(SorterError),
}

impl WatchEvent {
    const fn ends_single_run(&self) -> bool {
        !matches!(self, Self::Position(_))
    }

    pub(crate) fn to_json(&self) -> Value {
        match self {
            Self::Position(position) => json!({
                "event": "position",
                "position": position,
            }),
            Self::Update(update) => update_json(update),
            Self::Error(error) => json!({
                "event": "error",
                "kind": error.kind().as_str(),
                "message": error.message(),
                "code": error.code().map(|code| code.code()),
            }),
        }
    }
}

fn update_json(update: &CollectionUpdate) -> Value {
    let stats = RouteStats::compute(&update.collections);
    json!({
        "event": "update",
        "origin": if update.is_fetch() { "fetch" } else { "filter" },
        "filters": update.filters,
        "total": update.all_collections.len(),
        "collections": update.collections,
        "stats": {
            "count": stats.count,
            "nearest": stats.nearest.as_ref().map(|collection| collection.id.as_str()),
            "farthest": stats.farthest.as_ref().map(|collection| collection.id.as_str()),
            "total_distance_km": stats.total_distance_km,
            "estimated_time_secs": stats.estimated_time.as_secs(),
        },
        "server_stats": update.metadata().map(|metadata| &metadata.stats),
    })
}

/// Forwards sorter notifications to the writing loop.
struct ForwardingObserver {
    events: mpsc::UnboundedSender<WatchEvent>,
}

impl ForwardingObserver {
    fn forward(&self, event: WatchEvent) {
        if self.events.send(event).is_err() {
            log::debug!("watch output closed; dropping event");
        }
    }
}

impl SorterObserver for ForwardingObserver {
    fn on_update(&self, update: &CollectionUpdate) {
        self.forward(WatchEvent::Update(update.clone()));
    }

    fn on_error(&self, error: &SorterError) {
        self.forward(WatchEvent::Error(error.clone()));
    }

    fn on_position_change(&self, position: &Position) {
        self.forward(WatchEvent::Position(*position));
    }
}

/// Starts the sorter for the current watch invocation.
pub(super) trait WatchSorterBuilder {
    fn build(
        &self,
        config: SorterConfig,
        location: FixedLocationProvider,
    ) -> Result<CollectionSorter, CliError>;
}

pub(super) struct DefaultWatchSorterBuilder;

impl WatchSorterBuilder for DefaultWatchSorterBuilder {
    fn build(
        &self,
        config: SorterConfig,
        location: FixedLocationProvider,
    ) -> Result<CollectionSorter, CliError> {
        let endpoint = config.endpoint.clone();
        CollectionSorter::start(config, location)
            .map_err(|source| CliError::BuildCollectionSource { endpoint, source })
    }
}

pub(super) fn run_watch(args: WatchArgs) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    let builder = DefaultWatchSorterBuilder;
    run_watch_with(args, &builder, &mut stdout)
}

pub(super) fn run_watch_with(
    args: WatchArgs,
    builder: &dyn WatchSorterBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(stream_events(&config, builder, writer, interrupted()))
}

async fn interrupted() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        log::warn!("cannot listen for Ctrl-C: {err}");
        std::future::pending::<()>().await;
    }
}

/// Run a sorter and print its notifications until `shutdown` resolves.
///
/// With `config.once` set, returns after the first update or error.
pub(super) async fn stream_events(
    config: &WatchConfig,
    builder: &dyn WatchSorterBuilder,
    writer: &mut dyn Write,
    shutdown: impl Future<Output = ()>,
) -> Result<(), CliError> {
    let (events_tx, mut events) = mpsc::unbounded_channel();
    let sorter_config = config
        .sorter_config()
        .with_observer(ForwardingObserver { events: events_tx });
    let location = FixedLocationProvider::new(config.position.with_timestamp(now_millis()));
    let sorter = builder.build(sorter_config, location)?;

    let outcome = forward_events(config.once, &mut events, writer, shutdown).await;
    sorter.shutdown().await;
    outcome
}

async fn forward_events(
    once: bool,
    events: &mut mpsc::UnboundedReceiver<WatchEvent>,
    writer: &mut dyn Write,
    shutdown: impl Future<Output = ()>,
) -> Result<(), CliError> {
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            biased;

            () = &mut shutdown => {
                log::info!("interrupted; stopping the sorter");
                return Ok(());
            }

            event = events.recv() => {
                let Some(event) = event else {
                    return Ok(());
                };
                write_event(writer, &event)?;
                if once && event.ends_single_run() {
                    return Ok(());
                }
            }
        }
    }
}

fn write_event(writer: &mut dyn Write, event: &WatchEvent) -> Result<(), CliError> {
    let line = serde_json::to_string(&event.to_json()).map_err(CliError::SerializeEvent)?;
    writer
        .write_all(line.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    writer.flush().map_err(CliError::WriteOutput)
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |elapsed| {
            u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
        })
}
