//! Behaviour-driven step definitions driving the watch CLI scenarios.

use super::helpers::{StubWatchSorterBuilder, event_names, json_lines};
use super::*;
use clap::Parser;
use rstest::fixture;
use rstest_bdd_macros::{given, scenario, then, when};
use std::cell::RefCell;
use tricycle_core::test_support::collection_at_distance;
use tricycle_core::{CollectionStatus, FetchError};

#[derive(Debug)]
struct WatchWorld {
    builder: RefCell<Option<StubWatchSorterBuilder>>,
    include_lon: RefCell<bool>,
    cli_args: RefCell<Vec<String>>,
    stdout: RefCell<Vec<u8>>,
    result: RefCell<Option<Result<(), CliError>>>,
}

impl WatchWorld {
    fn new() -> Self {
        Self {
            builder: RefCell::new(None),
            include_lon: RefCell::new(true),
            cli_args: RefCell::new(Vec::new()),
            stdout: RefCell::new(Vec::new()),
            result: RefCell::new(None),
        }
    }

    fn build_command_line(&self) -> Vec<String> {
        let mut argv = vec![
            "tricycle".to_owned(),
            "watch".to_owned(),
            format!("--{ARG_WATCH_LAT}"),
            "5.3453".to_owned(),
            format!("--{ARG_WATCH_ONCE}"),
        ];
        if *self.include_lon.borrow() {
            argv.extend([format!("--{ARG_WATCH_LON}"), "-4.0244".to_owned()]);
        }
        argv.extend(self.cli_args.borrow().iter().cloned());
        argv
    }

    fn printed(&self) -> Vec<serde_json::Value> {
        json_lines(&self.stdout.borrow())
    }
}

#[fixture]
fn world() -> WatchWorld {
    WatchWorld::new()
}

#[given("the server ranks three collections")]
fn server_ranks_three(#[from(world)] world: &WatchWorld) {
    let collections = vec![
        collection_at_distance("near", 0.5, CollectionStatus::Scheduled),
        collection_at_distance("done", 1.5, CollectionStatus::Completed),
        collection_at_distance("far", 4.0, CollectionStatus::Pending),
    ];
    world
        .builder
        .replace(Some(StubWatchSorterBuilder::returning(collections)));
}

#[given("the server reports a failure")]
fn server_reports_failure(#[from(world)] world: &WatchWorld) {
    world.builder.replace(Some(StubWatchSorterBuilder::failing(
        FetchError::api(Some("no data".to_owned())),
    )));
}

#[given("I ask to hide completed collections")]
fn hide_completed(#[from(world)] world: &WatchWorld) {
    world
        .cli_args
        .borrow_mut()
        .push(format!("--{ARG_WATCH_HIDE_COMPLETED}"));
}

#[given("I omit the longitude")]
fn omit_longitude(#[from(world)] world: &WatchWorld) {
    *world.include_lon.borrow_mut() = false;
}

#[when("I run the watch command once")]
fn run_watch_command(#[from(world)] world: &WatchWorld) {
    let invocation = world.build_command_line();
    let builder = world
        .builder
        .borrow()
        .clone()
        .expect("a server outcome should be configured");
    let parsed = Cli::try_parse_from(invocation).map_err(CliError::from);
    let outcome = parsed.and_then(|cli| match cli.command {
        Command::Watch(args) => {
            let mut buffer = world.stdout.borrow_mut();
            run_watch_with(args, &builder, &mut *buffer)
        }
    });

    world.result.replace(Some(outcome));
}

#[then("the output lists a position followed by an update of three collections")]
fn position_then_update(#[from(world)] world: &WatchWorld) {
    let lines = world.printed();
    assert_eq!(event_names(&lines), ["position", "update"]);
    assert_eq!(lines[1]["collections"].as_array().map(Vec::len), Some(3));
    assert_eq!(lines[1]["stats"]["nearest"], "near");
    assert_eq!(lines[1]["stats"]["farthest"], "far");
}

#[then("the printed update holds two of the three collections")]
fn update_hides_completed(#[from(world)] world: &WatchWorld) {
    let lines = world.printed();
    let update = lines.last().expect("an update line");
    assert_eq!(update["event"], "update");
    assert_eq!(update["total"], 3);
    let ids: Vec<_> = update["collections"]
        .as_array()
        .expect("collections array")
        .iter()
        .map(|collection| collection["id"].as_str().expect("id"))
        .collect();
    assert_eq!(ids, ["near", "far"]);
}

#[then("the output ends with an api error event")]
fn ends_with_api_error(#[from(world)] world: &WatchWorld) {
    let borrowed = world.result.borrow();
    borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect("fetch failures do not fail the command");

    let lines = world.printed();
    let last = lines.last().expect("an error line");
    assert_eq!(last["event"], "error");
    assert_eq!(last["kind"], "api");
    assert_eq!(last["message"], "no data");
}

#[then("the command fails because the longitude is missing")]
fn fails_missing_longitude(#[from(world)] world: &WatchWorld) {
    let borrowed = world.result.borrow();
    let error = borrowed
        .as_ref()
        .expect("result recorded")
        .as_ref()
        .expect_err("expected error");
    match error {
        CliError::MissingArgument { field, env } => {
            assert_eq!(*field, ARG_WATCH_LON);
            assert_eq!(*env, ENV_WATCH_LON);
        }
        other => panic!("expected MissingArgument, found {other:?}"),
    }
    assert!(world.stdout.borrow().is_empty());
}

macro_rules! register_watch_scenario {
    ($fn_name:ident, $scenario_title:literal) => {
        #[scenario(path = "tests/features/watch_command.feature", name = $scenario_title)]
        fn $fn_name(#[from(world)] world: WatchWorld) {
            let _ = world;
        }
    };
}

register_watch_scenario!(watch_single_update, "streaming a single update");
register_watch_scenario!(watch_hide_completed, "hiding completed collections from the output");
register_watch_scenario!(watch_server_failure, "printing a server failure");
register_watch_scenario!(watch_missing_longitude, "rejecting a missing longitude");
