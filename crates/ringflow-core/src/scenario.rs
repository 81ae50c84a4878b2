//! Scenario runner: schedule in, committed entries and a report out.
//!
//! A run either commits every entry of its scenario or nothing. Inputs are
//! read up front, the simulation works on private state, and the store is
//! only written once the whole schedule has been simulated.

use ringflow_graph::{BlockGraph, DirectionCache, Navigator};
use ringflow_store::MineStore;
use ringflow_types::{Scenario, ScheduleEntry, ScheduleRow};
use tracing::info;

use crate::config::EngineConfig;
use crate::error::ScenarioError;
use crate::report::{ProductionReport, build_report};
use crate::rings::RingIndex;
use crate::schedule::{collapse_duplicates, resolve_rows};
use crate::simulator::Simulator;
use crate::warnings::{SimulationWarning, Warnings};

/// An uploaded schedule to simulate.
#[derive(Debug, Clone)]
pub struct ScenarioRequest {
    /// The scenario the entries will belong to. Must not be committed yet.
    pub scenario: Scenario,
    /// Schedule rows in upload order.
    pub rows: Vec<ScheduleRow>,
}

impl ScenarioRequest {
    /// A request for a fresh scenario named `name`.
    pub fn new(name: impl Into<String>, owner: Option<String>, rows: Vec<ScheduleRow>) -> Self {
        Self {
            scenario: Scenario::new(name, owner),
            rows,
        }
    }
}

/// Result of a committed scenario.
#[derive(Debug, Clone)]
pub struct ScenarioOutcome {
    /// The committed scenario.
    pub scenario: Scenario,
    /// Its committed entries, in processing order.
    pub entries: Vec<ScheduleEntry>,
    /// Drive by period report, with orphan count and warnings.
    pub report: ProductionReport,
}

/// Simulate a schedule against `graph` and commit it to `store`.
///
/// Mining directions resolved during the run are saved back as cached
/// records after the commit.
///
/// # Errors
///
/// Returns [`ScenarioError::UnresolvedBlock`] if a row names an unknown
/// block, [`ScenarioError::Simulation`] if a drive's direction cannot be
/// resolved, or [`ScenarioError::Store`] if reading inputs or committing
/// fails (including a scenario id that is already committed). No entry is
/// committed in any of these cases.
pub fn run_scenario<S>(
    store: &S,
    graph: &BlockGraph,
    config: &EngineConfig,
    request: ScenarioRequest,
) -> Result<ScenarioOutcome, ScenarioError>
where
    S: MineStore + ?Sized,
{
    let scenario = request.scenario;
    info!(
        scenario = %scenario.id,
        name = %scenario.name,
        rows = request.rows.len(),
        "Running scenario"
    );

    // 1. Read inputs
    let rings = RingIndex::load(store)?;
    let directions = DirectionCache::with_records(
        store.directions()?,
        config.simulation.allow_geometric_direction,
    );
    let mut warnings = Warnings::new();
    if rings.orphaned() > 0 {
        warnings.push(SimulationWarning::OrphanedRings {
            count: rings.orphaned(),
        });
    }

    // 2. Resolve the schedule
    let rows = resolve_rows(graph, collapse_duplicates(request.rows), &mut warnings)?;

    // 3. Simulate
    let navigator = Navigator::new(graph, config.navigation.max_walk_steps);
    let run = Simulator::new(
        store,
        navigator,
        &rings,
        directions,
        &config.simulation,
        scenario.id,
        warnings,
    )
    .run(&rows)?;

    // 4. Commit
    store.commit_scenario(scenario.clone(), run.entries.clone())?;
    if !run.fresh_directions.is_empty() {
        store.save_directions(run.fresh_directions)?;
    }

    let report = build_report(
        &run.entries,
        config.report.period,
        rings.orphaned(),
        run.warnings.into_vec(),
    );
    info!(
        scenario = %scenario.id,
        entries = run.entries.len(),
        drives = report.rows.len(),
        warnings = report.warnings.len(),
        "Scenario committed"
    );
    Ok(ScenarioOutcome {
        scenario,
        entries: run.entries,
        report,
    })
}

/// Delete a committed scenario together with its entries.
///
/// # Errors
///
/// Returns [`ScenarioError::Store`] if the scenario does not exist or the
/// delete fails.
pub fn delete_scenario<S>(store: &S, scenario: &Scenario) -> Result<(), ScenarioError>
where
    S: MineStore + ?Sized,
{
    store.delete_scenario(scenario.id)?;
    info!(scenario = %scenario.id, name = %scenario.name, "Scenario deleted");
    Ok(())
}
