//! Core record structs shared by the store, graph, and simulator crates.
//!
//! Coordinates and metres are fixed-precision [`Decimal`] values as
//! delivered by the ingestion collaborator. Geometry converts to `f64` only
//! at the point of measurement.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{Bearing, DirectionSource, LinkRole, RingStatus};
use crate::ids::{BlockId, RingId, ScenarioId, ScheduleEntryId};

// ---------------------------------------------------------------------------
// Blocks and the adjacency graph
// ---------------------------------------------------------------------------

/// A point in mine coordinates (`x` east, `y` north, `z` elevation).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Position {
    /// Easting.
    pub x: Decimal,
    /// Northing.
    pub y: Decimal,
    /// Elevation. Ignored by all planar geometry.
    pub z: Decimal,
}

impl Position {
    /// Create a position from its three components.
    pub const fn new(x: Decimal, y: Decimal, z: Decimal) -> Self {
        Self { x, y, z }
    }
}

/// A spatially located planning block ("concept ring").
///
/// Blocks are written by the ingestion collaborator. The core treats them
/// as immutable; only `alias` may be rewritten when drives are regrouped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    /// Unique identifier.
    pub id: BlockId,
    /// Mining level the block sits on.
    pub level: i32,
    /// Drive (oredrive) name the block belongs to.
    pub description: String,
    /// Optional display alias.
    #[serde(default)]
    pub alias: Option<String>,
    /// Block centroid.
    pub position: Position,
    /// External identifier used by uploaded schedules.
    pub blastsolids_id: String,
    /// Inactive blocks are ignored by the graph builder and navigator.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Block {
    /// Create an active block with a fresh identifier and no alias.
    pub fn new(
        level: i32,
        description: impl Into<String>,
        blastsolids_id: impl Into<String>,
        position: Position,
    ) -> Self {
        Self {
            id: BlockId::new(),
            level,
            description: description.into(),
            alias: None,
            position,
            blastsolids_id: blastsolids_id.into(),
            is_active: true,
        }
    }
}

/// Directed "nearest block on this bearing" relation between two blocks on
/// the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjacencyEdge {
    /// Source block.
    pub block: BlockId,
    /// Nearest block found on `bearing` from the source.
    pub adjacent_block: BlockId,
    /// Octant of `adjacent_block` as seen from `block`.
    pub bearing: Bearing,
}

/// Optional sequencing hint from upstream planning data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SequenceLink {
    /// The block the hint is attached to.
    pub block: BlockId,
    /// The block it is sequenced against.
    pub linked_block: BlockId,
    /// Whether `linked_block` comes before or after `block`.
    pub role: LinkRole,
}

/// Cached mining direction of a drive. Derived data, rebuildable at will.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiningDirectionRecord {
    /// Drive name.
    pub description: String,
    /// Canonical direction of advance.
    pub direction: Bearing,
    /// Block farthest against the direction.
    pub first_block: BlockId,
    /// Block farthest along the direction.
    pub last_block: BlockId,
    /// Whether the direction came from a sequencing hint or the fallback.
    pub source: DirectionSource,
}

// ---------------------------------------------------------------------------
// Production rings
// ---------------------------------------------------------------------------

/// A mined instance of a block, owned by the record-keeping layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductionRing {
    /// Unique identifier.
    pub id: RingId,
    /// Planning block the ring was mined against. `None` marks an orphan.
    #[serde(default)]
    pub block: Option<BlockId>,
    /// Drive name as recorded on the ring.
    pub oredrive: String,
    /// Level the ring was recorded on.
    pub level: i32,
    /// Primary lifecycle state.
    pub status: RingStatus,
    /// Drilled metres, when known.
    #[serde(default)]
    pub drilled_metres: Option<Decimal>,
    /// Inactive rings are ignored by every tally.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Scenarios and schedule entries
// ---------------------------------------------------------------------------

/// A named simulation run over one uploaded schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Unique identifier.
    pub id: ScenarioId,
    /// Display name.
    pub name: String,
    /// User who uploaded the schedule.
    #[serde(default)]
    pub owner: Option<String>,
    /// When the scenario was created.
    pub created_at: DateTime<Utc>,
}

impl Scenario {
    /// Create a scenario stamped with the current time.
    pub fn new(name: impl Into<String>, owner: Option<String>) -> Self {
        Self {
            id: ScenarioId::new(),
            name: name.into(),
            owner,
            created_at: Utc::now(),
        }
    }
}

/// One validated row of an uploaded schedule: a block-completion event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// External block identifier.
    pub blastsolids_id: String,
    /// Drive name as written in the schedule; re-derived from the block.
    #[serde(default)]
    pub description: Option<String>,
    /// Scheduled start.
    pub start: DateTime<Utc>,
    /// Scheduled finish.
    pub finish: DateTime<Utc>,
    /// Level as written in the schedule.
    pub level: i32,
}

/// One simulated time-step of a drive: where its fronts stand after the
/// scheduled event, and what was consumed since the previous step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    /// Unique identifier.
    pub id: ScheduleEntryId,
    /// Owning scenario.
    pub scenario: ScenarioId,
    /// Position of the entry in processing order within the scenario.
    pub sequence: u32,
    /// Drive name, taken from the resolved block.
    pub description: String,
    /// External identifier of the scheduled (bogging) block.
    pub blastsolids_id: String,
    /// Level of the drive.
    pub level: i32,
    /// Scheduled start.
    pub start: DateTime<Utc>,
    /// Scheduled finish.
    pub finish: DateTime<Utc>,
    /// Mining direction the fronts were advanced in.
    pub mining_direction: Option<Bearing>,
    /// Resolved bogging-front block.
    pub bogging_block: Option<BlockId>,
    /// Resolved last-charged block.
    pub last_charge_block: Option<BlockId>,
    /// Resolved last-drilled block.
    pub last_drill_block: Option<BlockId>,
    /// Rings drilled since the previous entry of the same drive.
    pub rings_since_prev: u32,
    /// Metres drilled since the previous entry of the same drive.
    pub metres_since_prev: Decimal,
    /// Rings charged since the previous entry of the same drive.
    pub charged_rings_since_prev: u32,
    /// `true` when the entry was created to give a neighbouring drive a
    /// state, rather than read from the uploaded schedule.
    pub synthesized: bool,
}

const fn default_active() -> bool {
    true
}
