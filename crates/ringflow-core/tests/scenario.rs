//! End-to-end scenario runs against the in-memory store.

#![allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects,
    clippy::float_cmp
)]

use chrono::{DateTime, TimeZone, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use ringflow_core::{
    EngineConfig, Front, ScenarioError, ScenarioOutcome, ScenarioRequest, SimulationWarning, delete_scenario,
    run_scenario,
};
use ringflow_graph::{BlockGraph, rebuild_mine};
use ringflow_store::{
    BlockRepository, DirectionRepository, MemoryStore, RingRepository, ScenarioRepository,
};
use ringflow_types::{
    Bearing, Block, Position, ProductionRing, RingId, RingStatus, ScenarioId, ScheduleEntry,
    ScheduleRow,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// `count` blocks of `drive` along y = `y`, 5 apart from x = 0, named
/// `{drive}-{i}`.
fn drive(name: &str, y: i64, count: i64) -> Vec<Block> {
    (0..count)
        .map(|i| {
            Block::new(
                5,
                name,
                format!("{name}-{i}"),
                Position::new(Decimal::from(i * 5), Decimal::from(y), Decimal::ZERO),
            )
        })
        .collect()
}

fn store_with(drives: &[&[Block]]) -> MemoryStore {
    let store = MemoryStore::new();
    let blocks: Vec<Block> = drives.iter().flat_map(|d| d.iter().cloned()).collect();
    store.upsert_blocks(blocks).unwrap();
    rebuild_mine(&store, 20.0).unwrap();
    store
}

fn ring(block: &Block, status: RingStatus) -> ProductionRing {
    ProductionRing {
        id: RingId::new(),
        block: Some(block.id),
        oredrive: block.description.clone(),
        level: block.level,
        status,
        drilled_metres: Some(dec!(120)),
        is_active: true,
    }
}

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, d, 7, 0, 0).unwrap()
}

fn row(identifier: &str, d: u32) -> ScheduleRow {
    ScheduleRow {
        blastsolids_id: identifier.to_owned(),
        description: None,
        start: day(d),
        finish: day(d),
        level: 5,
    }
}

fn run(store: &MemoryStore, rows: Vec<ScheduleRow>) -> Result<ScenarioOutcome, ScenarioError> {
    let graph = BlockGraph::load(store).unwrap();
    let request = ScenarioRequest::new("test", Some("planner".to_owned()), rows);
    run_scenario(store, &graph, &EngineConfig::default(), request)
}

fn scheduled<'a>(entries: &'a [ScheduleEntry], drive: &str) -> Vec<&'a ScheduleEntry> {
    entries
        .iter()
        .filter(|e| e.description == drive && !e.synthesized)
        .collect()
}

// ---------------------------------------------------------------------------
// Single drive
// ---------------------------------------------------------------------------

#[test]
fn first_row_of_an_idle_drive_seeds_at_the_first_block() {
    let a1 = drive("A1", 0, 11);
    let store = store_with(&[&a1]);

    let outcome = run(&store, vec![row("A1-2", 1)]).unwrap();
    assert_eq!(outcome.entries.len(), 1);
    let entry = &outcome.entries[0];

    assert_eq!(entry.mining_direction, Some(Bearing::East));
    assert_eq!(entry.bogging_block, Some(a1[2].id));
    // 7.5 ahead of x = 10 lands on x = 20; 10 ahead of that on x = 30.
    assert_eq!(entry.last_charge_block, Some(a1[4].id));
    assert_eq!(entry.last_drill_block, Some(a1[6].id));
    // Seeded at x = 0 inclusive, through x = 30: seven placeholder blocks.
    assert_eq!(entry.rings_since_prev, 7);
    assert_eq!(entry.metres_since_prev, dec!(1155));
    assert_eq!(entry.charged_rings_since_prev, 5);

    let warnings = &outcome.report.warnings;
    assert!(warnings.iter().any(|w| matches!(w, SimulationWarning::GeometricDirection { drive } if drive == "A1")));
    assert!(warnings.iter().any(|w| matches!(w, SimulationWarning::PlaceholderBlocks { blocks: 7, .. })));
}

#[test]
fn fronts_stop_at_the_end_of_the_drive() {
    let a1 = drive("A1", 0, 11);
    let store = store_with(&[&a1]);

    let outcome = run(&store, vec![row("A1-9", 1)]).unwrap();
    let entry = &outcome.entries[0];
    assert_eq!(entry.last_charge_block, Some(a1[10].id));
    assert_eq!(entry.last_drill_block, Some(a1[10].id));
    assert!(outcome.report.warnings.iter().any(|w| matches!(
        w,
        SimulationWarning::EndOfDrive { front: Front::Drill, .. }
    )));
}

#[test]
fn live_drilled_rings_are_never_regressed() {
    let a1 = drive("A1", 0, 11);
    let store = store_with(&[&a1]);
    store
        .upsert_rings(vec![ring(&a1[7], RingStatus::Drilled), ring(&a1[8], RingStatus::Drilled)])
        .unwrap();

    let outcome = run(&store, vec![row("A1-0", 1)]).unwrap();
    let entry = &outcome.entries[0];
    assert_eq!(entry.last_charge_block, Some(a1[2].id));
    assert_eq!(entry.last_drill_block, Some(a1[8].id));
    assert_eq!(entry.rings_since_prev, 0);
}

#[test]
fn charged_rings_are_not_drilled_again() {
    let a1 = drive("A1", 0, 11);
    let store = store_with(&[&a1]);
    store
        .upsert_rings(a1[..4].iter().map(|b| ring(b, RingStatus::Charged)).collect())
        .unwrap();

    let outcome = run(&store, vec![row("A1-0", 1)]).unwrap();
    let entry = &outcome.entries[0];
    assert_eq!(entry.last_charge_block, Some(a1[3].id));
    assert_eq!(entry.last_drill_block, Some(a1[5].id));
    // Only x = 20 and x = 25 are new drilling.
    assert_eq!(entry.rings_since_prev, 2);
    assert_eq!(entry.metres_since_prev, dec!(330));
    assert_eq!(entry.charged_rings_since_prev, 0);
}

#[test]
fn drill_tally_uses_ring_metres_where_rings_exist() {
    let a1 = drive("A1", 0, 11);
    let store = store_with(&[&a1]);
    store
        .upsert_rings(vec![ring(&a1[1], RingStatus::Designed), ring(&a1[1], RingStatus::Designed)])
        .unwrap();

    let outcome = run(&store, vec![row("A1-0", 1)]).unwrap();
    let entry = &outcome.entries[0];
    // x = 0..=20: block 1 has two rings of 120 m, four placeholder blocks.
    assert_eq!(entry.last_drill_block, Some(a1[4].id));
    assert_eq!(entry.rings_since_prev, 6);
    assert_eq!(entry.metres_since_prev, dec!(900));
}

#[test]
fn drill_front_never_moves_backward() {
    let a1 = drive("A1", 0, 21);
    let store = store_with(&[&a1]);
    let graph = BlockGraph::load(&store).unwrap();
    let mut rng = StdRng::seed_from_u64(17);

    for _ in 0..10 {
        let rows: Vec<ScheduleRow> = (1..=12)
            .map(|d| {
                let i: usize = rng.random_range(0..21);
                row(&format!("A1-{i}"), d)
            })
            .collect();
        let request = ScenarioRequest::new("mono", None, rows);
        let outcome = run_scenario(&store, &graph, &EngineConfig::default(), request).unwrap();

        let mut last = f64::NEG_INFINITY;
        for entry in scheduled(&outcome.entries, "A1") {
            let drill = entry.last_drill_block.unwrap();
            let advance = graph.advance(drill, Bearing::East).unwrap();
            assert!(advance >= last, "drill front moved back to {advance} from {last}");
            last = advance;
        }
    }
}

#[test]
fn duplicate_consecutive_rows_are_collapsed() {
    let a1 = drive("A1", 0, 11);
    let store = store_with(&[&a1]);
    let outcome = run(&store, vec![row("A1-2", 1), row("A1-2", 2), row("A1-3", 3)]).unwrap();
    assert_eq!(outcome.entries.len(), 2);
    assert_eq!(outcome.entries[0].finish, day(2));
}

// ---------------------------------------------------------------------------
// Interference
// ---------------------------------------------------------------------------

#[test]
fn drill_front_stops_short_of_a_neighbours_charge() {
    let x1 = drive("X1", 0, 11);
    let y1 = drive("Y1", 8, 11);
    let store = store_with(&[&x1, &y1]);
    store.upsert_rings(vec![ring(&y1[6], RingStatus::Charged)]).unwrap();

    let outcome = run(&store, vec![row("X1-2", 1)]).unwrap();
    let x = scheduled(&outcome.entries, "X1");
    assert_eq!(x.len(), 1);
    assert_eq!(x[0].last_charge_block, Some(x1[4].id));
    // Unclamped the drill front would reach x = 30; x = 25 is within 10 of
    // Y1's charge at (30, 8).
    assert_eq!(x[0].last_drill_block, Some(x1[4].id));
    assert!(outcome.report.warnings.iter().any(|w| matches!(
        w,
        SimulationWarning::InterferenceClamp { drive, neighbour, .. } if drive == "X1" && neighbour == "Y1"
    )));

    let synthesized: Vec<&ScheduleEntry> = outcome.entries.iter().filter(|e| e.synthesized).collect();
    assert_eq!(synthesized.len(), 1);
    assert_eq!(synthesized[0].description, "Y1");
    assert_eq!(synthesized[0].start, day(1));
    assert_eq!(synthesized[0].last_charge_block, Some(y1[6].id));
    assert_eq!(synthesized[0].rings_since_prev, 0);
}

#[test]
fn distant_neighbour_charge_does_not_clamp() {
    let x1 = drive("X1", 0, 11);
    let y1 = drive("Y1", 8, 11);
    let store = store_with(&[&x1, &y1]);
    store.upsert_rings(vec![ring(&y1[10], RingStatus::Charged)]).unwrap();

    let outcome = run(&store, vec![row("X1-2", 1)]).unwrap();
    let x = scheduled(&outcome.entries, "X1");
    assert_eq!(x[0].last_drill_block, Some(x1[6].id));
    assert!(!outcome
        .report
        .warnings
        .iter()
        .any(|w| matches!(w, SimulationWarning::InterferenceClamp { .. })));
}

#[test]
fn neighbour_is_synthesized_once_per_scenario() {
    let x1 = drive("X1", 0, 11);
    let y1 = drive("Y1", 8, 11);
    let store = store_with(&[&x1, &y1]);

    let outcome = run(&store, vec![row("X1-1", 1), row("X1-3", 2), row("X1-5", 3)]).unwrap();
    assert_eq!(outcome.entries.iter().filter(|e| e.synthesized).count(), 1);
    assert_eq!(scheduled(&outcome.entries, "X1").len(), 3);
}

#[test]
fn scheduled_neighbour_charge_clamps_later_rows() {
    let x1 = drive("X1", 0, 11);
    let y1 = drive("Y1", 8, 11);
    let store = store_with(&[&x1, &y1]);

    // Y1 bogs at x = 25, so its charge front sits at x = 35 from day 1.
    let outcome = run(&store, vec![row("Y1-5", 1), row("X1-2", 2)]).unwrap();
    let x = scheduled(&outcome.entries, "X1");
    assert_eq!(x[0].last_drill_block, Some(x1[5].id));

    let graph = BlockGraph::load(&store).unwrap();
    let gap = graph.distance(x1[5].id, y1[7].id).unwrap();
    assert!(gap >= 10.0, "drill front {gap} from neighbour charge");
    // X1 was seeded when Y1 first advanced, so it is not synthesized again.
    let synthesized: Vec<&ScheduleEntry> = outcome.entries.iter().filter(|e| e.synthesized).collect();
    assert_eq!(synthesized.len(), 1);
    assert_eq!(synthesized[0].description, "X1");
}

#[test]
fn same_day_neighbour_sees_the_charge_advanced_that_day() {
    let x1 = drive("X1", 0, 11);
    let y1 = drive("Y1", 8, 11);
    let store = store_with(&[&x1, &y1]);

    // X1 is uploaded first, so on day 1 it advances before Y1.
    let outcome = run(
        &store,
        vec![row("X1-2", 1), row("Y1-0", 1), row("X1-3", 2)],
    )
    .unwrap();

    let x = scheduled(&outcome.entries, "X1");
    let y = scheduled(&outcome.entries, "Y1");
    assert_eq!(x.len(), 2);
    assert_eq!(y.len(), 1);

    // X1 charges to x = 20 on day 1. Y1 would drill to x = 20, but x = 15
    // is within 10 of that charge, so Y1 holds at its own charge front.
    assert_eq!(x[0].last_charge_block, Some(x1[4].id));
    assert_eq!(y[0].last_charge_block, Some(y1[2].id));
    assert_eq!(y[0].last_drill_block, Some(y1[2].id));
    assert!(outcome.report.warnings.iter().any(|w| matches!(
        w,
        SimulationWarning::InterferenceClamp { drive, neighbour, .. } if drive == "Y1" && neighbour == "X1"
    )));

    // Neither drill front moves back.
    assert_eq!(x[0].last_drill_block, Some(x1[6].id));
    assert_eq!(x[1].last_drill_block, Some(x1[7].id));

    // Y1 was seeded once, when X1 first consulted it.
    let synthesized: Vec<&ScheduleEntry> = outcome.entries.iter().filter(|e| e.synthesized).collect();
    assert_eq!(synthesized.len(), 1);
    assert_eq!(synthesized[0].description, "Y1");
    assert_eq!(synthesized[0].start, day(1));
}

// ---------------------------------------------------------------------------
// Failure and persistence
// ---------------------------------------------------------------------------

#[test]
fn unresolvable_identifier_aborts_without_writes() {
    let a1 = drive("A1", 0, 11);
    let store = store_with(&[&a1]);
    let graph = BlockGraph::load(&store).unwrap();
    let request = ScenarioRequest::new("bad", None, vec![row("A1-2", 1), row("NOPE-9", 2)]);
    let scenario_id = request.scenario.id;

    let err = run_scenario(&store, &graph, &EngineConfig::default(), request).unwrap_err();
    assert!(matches!(err, ScenarioError::UnresolvedBlock { ref identifier } if identifier == "NOPE-9"));
    assert!(store.scenario(scenario_id).unwrap().is_none());
    assert!(store.scenario_entries(scenario_id).unwrap().is_empty());
    assert!(store.directions().unwrap().is_empty());
}

#[test]
fn single_block_drive_is_a_fatal_direction_error() {
    let lone = drive("L1", 0, 1);
    let store = store_with(&[&lone]);
    let err = run(&store, vec![row("L1-0", 1)]).unwrap_err();
    assert!(matches!(err, ScenarioError::Simulation { .. }));
    assert!(err.to_string().contains("L1"));
}

#[test]
fn geometric_fallback_can_be_disabled() {
    let a1 = drive("A1", 0, 5);
    let store = store_with(&[&a1]);
    let graph = BlockGraph::load(&store).unwrap();
    let mut config = EngineConfig::default();
    config.simulation.allow_geometric_direction = false;
    let request = ScenarioRequest::new("strict", None, vec![row("A1-0", 1)]);
    assert!(run_scenario(&store, &graph, &config, request).is_err());
}

#[test]
fn committed_scenario_round_trips_and_deletes() {
    let a1 = drive("A1", 0, 11);
    let store = store_with(&[&a1]);
    let outcome = run(&store, vec![row("A1-1", 1), row("A1-4", 20)]).unwrap();
    let id = outcome.scenario.id;

    let stored = store.scenario_entries(id).unwrap();
    assert_eq!(stored, outcome.entries);
    assert_eq!(store.direction("A1").unwrap().map(|r| r.direction), Some(Bearing::East));

    assert_eq!(outcome.report.periods, vec!["2025-04"]);
    let total: u64 = outcome.report.rows[0].cells.iter().map(|c| c.rings).sum();
    let entries_total: u64 = outcome.entries.iter().map(|e| u64::from(e.rings_since_prev)).sum();
    assert_eq!(total, entries_total);

    delete_scenario(&store, &outcome.scenario).unwrap();
    assert!(store.scenario(id).unwrap().is_none());
    assert!(store.scenario_entries(id).unwrap().is_empty());
}

#[test]
fn orphaned_rings_are_counted_not_tallied() {
    let a1 = drive("A1", 0, 11);
    let store = store_with(&[&a1]);
    let mut orphan = ring(&a1[0], RingStatus::Drilled);
    orphan.block = None;
    store.upsert_rings(vec![orphan]).unwrap();

    let outcome = run(&store, vec![row("A1-2", 1)]).unwrap();
    assert_eq!(outcome.report.orphaned_rings, 1);
    assert!(outcome
        .report
        .warnings
        .iter()
        .any(|w| matches!(w, SimulationWarning::OrphanedRings { count: 1 })));
    assert_eq!(outcome.entries[0].metres_since_prev, dec!(1155));
}

#[test]
fn scenarios_run_concurrently_on_a_shared_store() {
    let a1 = drive("A1", 0, 11);
    let b1 = drive("B1", 100, 11);
    let store = store_with(&[&a1, &b1]);
    let graph = BlockGraph::load(&store).unwrap();
    let config = EngineConfig::default();

    let ids: Vec<ScenarioId> = std::thread::scope(|scope| {
        let handles: Vec<_> = ["A1-1", "B1-1", "A1-5"]
            .into_iter()
            .map(|identifier| {
                let (store, graph, config) = (&store, &graph, &config);
                scope.spawn(move || {
                    let request = ScenarioRequest::new(identifier, None, vec![row(identifier, 1)]);
                    run_scenario(store, graph, config, request).unwrap().scenario.id
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    for id in ids {
        assert_eq!(store.scenario_entries(id).unwrap().len(), 1);
    }
}
