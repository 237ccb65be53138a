//! Builders and parsers shared by the CLI tests.

use super::*;
use serde_json::Value;
use tricycle_core::{CollectionPoint, FetchError};
use tricycle_data::ranking::test_support::StubCollectionSource;
use tricycle_tracker::{CollectionSorter, FixedLocationProvider, SorterConfig};

/// Starts sorters against an in-memory source with a canned outcome.
#[derive(Debug, Clone)]
pub(super) struct StubWatchSorterBuilder {
    outcome: Result<Vec<CollectionPoint>, FetchError>,
}

impl StubWatchSorterBuilder {
    pub(super) const fn returning(collections: Vec<CollectionPoint>) -> Self {
        Self {
            outcome: Ok(collections),
        }
    }

    pub(super) const fn failing(error: FetchError) -> Self {
        Self {
            outcome: Err(error),
        }
    }
}

impl WatchSorterBuilder for StubWatchSorterBuilder {
    fn build(
        &self,
        config: SorterConfig,
        location: FixedLocationProvider,
    ) -> Result<CollectionSorter, CliError> {
        let source = match &self.outcome {
            Ok(collections) => StubCollectionSource::with_collections(collections.clone()),
            Err(error) => StubCollectionSource::with_error(error.clone()),
        };
        Ok(CollectionSorter::start_with_source(config, source, location))
    }
}

/// Parse every line of `output` as JSON.
pub(super) fn json_lines(output: &[u8]) -> Vec<Value> {
    let text = std::str::from_utf8(output).expect("output should be UTF-8");
    text.lines()
        .map(|line| serde_json::from_str(line).expect("each line should be JSON"))
        .collect()
}

/// The `event` tag of each line.
pub(super) fn event_names(lines: &[Value]) -> Vec<&str> {
    lines
        .iter()
        .map(|line| line["event"].as_str().expect("event tag"))
        .collect()
}

/// Arguments for a run at a fixed point in Abidjan.
pub(super) fn watch_args() -> WatchArgs {
    WatchArgs {
        lat: Some(5.3453),
        lon: Some(-4.0244),
        ..WatchArgs::default()
    }
}
