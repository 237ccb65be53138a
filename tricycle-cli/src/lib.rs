//! Command-line interface for watching distance-ranked collections.
#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};

mod error;
mod watch;

pub use error::CliError;

use watch::WatchArgs;

const ARG_WATCH_ENDPOINT: &str = "endpoint";
const ARG_WATCH_LAT: &str = "lat";
const ARG_WATCH_LON: &str = "lon";
const ARG_WATCH_ACCURACY: &str = "accuracy";
const ARG_WATCH_DATE: &str = "date";
const ARG_WATCH_MAX_DISTANCE: &str = "max-distance";
const ARG_WATCH_HIDE_COMPLETED: &str = "hide-completed";
const ARG_WATCH_REFRESH_SECS: &str = "refresh-secs";
const ARG_WATCH_ONCE: &str = "once";
const ENV_WATCH_LAT: &str = "TRICYCLE_CMDS_WATCH_LAT";
const ENV_WATCH_LON: &str = "TRICYCLE_CMDS_WATCH_LON";

/// Run the Tricycle CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Watch(args) => watch::run_watch(args),
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "tricycle",
    about = "Track a position and stream collection points ranked by distance",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Rank collections around a fixed position and print events as JSON lines.
    Watch(WatchArgs),
}

#[cfg(test)]
mod tests;
