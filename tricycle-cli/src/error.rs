//! Error types emitted by the Tricycle CLI.
//!
//! Fetch and geolocation failures are not errors here: the sorter reports
//! them as events and the command keeps running.

use std::sync::Arc;

use thiserror::Error;
use tricycle_data::SourceBuildError;

/// Errors emitted by the Tricycle CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// Constructing the ranking source failed.
    #[error("failed to build collection source for {endpoint:?}: {source}")]
    BuildCollectionSource {
        endpoint: String,
        #[source]
        source: SourceBuildError,
    },
    /// The async runtime could not be started.
    #[error("failed to start runtime: {0}")]
    Runtime(#[source] std::io::Error),
    /// Serializing an event failed.
    #[error("failed to serialize event: {0}")]
    SerializeEvent(#[source] serde_json::Error),
    /// Writing the event stream failed.
    #[error("failed to write output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
