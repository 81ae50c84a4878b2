//! Ringflow engine binary.
//!
//! Loads configuration and a mine dataset, rebuilds the adjacency graph,
//! resolves every drive's mining direction, then simulates every uploaded
//! schedule concurrently and prints the resulting reports as JSON.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `ringflow-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Load the dataset into the in-memory store
//! 4. Rebuild adjacency for every level
//! 5. Load the block graph and refresh mining directions
//! 6. Run every scenario on a blocking worker
//! 7. Print the reports

mod dataset;
mod error;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ringflow_core::{EngineConfig, ProductionReport, ScenarioRequest, run_scenario};
use ringflow_graph::{BlockGraph, Navigator, rebuild_mine, refresh_directions};
use ringflow_store::MemoryStore;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::dataset::{DEFAULT_DATASET_PATH, Dataset};
use crate::error::EngineError;

/// Config file looked up in the working directory.
const CONFIG_PATH: &str = "ringflow-config.yaml";

/// One scenario's output line.
#[derive(Debug, Serialize)]
struct ScenarioSummary {
    scenario: String,
    entries: usize,
    report: ProductionReport,
}

/// Application entry point.
///
/// The dataset path is the first command-line argument, defaulting to
/// `ringflow-dataset.json`.
#[tokio::main]
async fn main() -> Result<(), EngineError> {
    // 1. Load configuration.
    let config = load_config()?;

    // 2. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.level)),
        )
        .with_target(true)
        .init();

    info!(
        search_radius = config.adjacency.search_radius,
        max_walk_steps = config.navigation.max_walk_steps,
        period = ?config.report.period,
        "ringflow-engine starting"
    );

    // 3. Load the dataset.
    let dataset_path = std::env::args_os()
        .nth(1)
        .map_or_else(|| PathBuf::from(DEFAULT_DATASET_PATH), PathBuf::from);
    let store = Arc::new(MemoryStore::new());
    let requests = Dataset::from_file(&dataset_path)?.load_into(&store)?;
    info!(
        path = %dataset_path.display(),
        scenarios = requests.len(),
        "Dataset read"
    );

    // 4. Rebuild adjacency.
    let rebuilt = rebuild_mine(store.as_ref(), config.adjacency.search_radius)?;
    info!(levels = rebuilt.len(), "Adjacency rebuilt");

    // 5. Load the graph and refresh directions.
    let graph = Arc::new(BlockGraph::load(store.as_ref())?);
    let navigator = Navigator::new(&graph, config.navigation.max_walk_steps);
    let refresh = refresh_directions(
        store.as_ref(),
        &navigator,
        config.simulation.allow_geometric_direction,
    )?;
    for failure in &refresh.failed {
        warn!(error = %failure, "Drive has no mining direction");
    }
    info!(
        drives = graph.drive_names().count(),
        resolved = refresh.resolved.len(),
        failed = refresh.failed.len(),
        "Block graph ready"
    );

    // 6. Run scenarios.
    let summaries = run_all(&store, &graph, &Arc::new(config), requests).await?;

    // 7. Print reports.
    for summary in &summaries {
        println!("{}", serde_json::to_string_pretty(summary)?);
    }
    info!(scenarios = summaries.len(), "ringflow-engine shutdown complete");

    Ok(())
}

/// Load the engine configuration from `ringflow-config.yaml`.
///
/// Looks for the config file relative to the current working directory.
fn load_config() -> Result<EngineConfig, EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if config_path.exists() {
        Ok(EngineConfig::from_file(config_path)?)
    } else {
        Ok(EngineConfig::default())
    }
}

/// Run every request on its own blocking worker and collect the outcomes
/// in request order. The first failing scenario fails the batch; scenarios
/// that succeeded stay committed.
async fn run_all(
    store: &Arc<MemoryStore>,
    graph: &Arc<BlockGraph>,
    config: &Arc<EngineConfig>,
    requests: Vec<ScenarioRequest>,
) -> Result<Vec<ScenarioSummary>, EngineError> {
    let handles: Vec<_> = requests
        .into_iter()
        .map(|request| {
            let store = Arc::clone(store);
            let graph = Arc::clone(graph);
            let config = Arc::clone(config);
            tokio::task::spawn_blocking(move || {
                run_scenario(store.as_ref(), &graph, &config, request).map(|outcome| {
                    ScenarioSummary {
                        scenario: outcome.scenario.name,
                        entries: outcome.entries.len(),
                        report: outcome.report,
                    }
                })
            })
        })
        .collect();

    let mut summaries = Vec::with_capacity(handles.len());
    for joined in futures::future::join_all(handles).await {
        summaries.push(joined??);
    }
    Ok(summaries)
}
