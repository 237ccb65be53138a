//! Shared test harness modules for the Tricycle CLI.
#![expect(
    clippy::panic,
    reason = "Tests assert panic branches to surface unexpected CLI outcomes"
)]

use super::*;
use crate::watch::{
    WatchArgs, WatchConfig, WatchEvent, WatchSorterBuilder, run_watch_with, stream_events,
};

mod helpers;
mod watch_steps;
