//! Shared type definitions for the ringflow block-graph and schedule
//! simulator.
//!
//! This crate is the single source of truth for the records exchanged
//! between the store, the graph, and the simulator.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for all entity identifiers
//! - [`enums`] -- Bearings, ring states, link roles, report periods
//! - [`structs`] -- Blocks, edges, links, rings, scenarios, schedule entries

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{Bearing, DirectionSource, LinkRole, ReportPeriod, RingStatus};
pub use ids::{BlockId, RingId, ScenarioId, ScheduleEntryId};
pub use structs::{
    AdjacencyEdge, Block, MiningDirectionRecord, Position, ProductionRing, Scenario,
    ScheduleEntry, ScheduleRow, SequenceLink,
};
