//! Repository traits consumed by the graph builder and the simulator.
//!
//! All operations are synchronous. Implementations must be `Send + Sync` so
//! that independent scenario workers can share one store. Any write that
//! replaces a set of rows (a level's edges, a scenario's entries) must be
//! observed whole or not at all.

use ringflow_types::{
    AdjacencyEdge, Block, BlockId, MiningDirectionRecord, ProductionRing, RingStatus, Scenario,
    ScenarioId, ScheduleEntry, SequenceLink,
};

use crate::error::StoreResult;

/// Block lookup by id, drive, and level.
pub trait BlockRepository {
    /// All blocks, active or not, in ingestion order.
    fn blocks(&self) -> StoreResult<Vec<Block>>;

    /// A single block by id.
    fn block(&self, id: BlockId) -> StoreResult<Option<Block>>;

    /// All blocks on a level, in ingestion order.
    fn blocks_on_level(&self, level: i32) -> StoreResult<Vec<Block>>;

    /// All blocks of a drive, in ingestion order.
    fn blocks_in_drive(&self, drive: &str) -> StoreResult<Vec<Block>>;

    /// Distinct levels holding at least one active block, ascending.
    fn levels(&self) -> StoreResult<Vec<i32>>;

    /// Insert or replace blocks by id. Returns the distinct levels touched,
    /// which the caller must rebuild.
    fn upsert_blocks(&self, blocks: Vec<Block>) -> StoreResult<Vec<i32>>;
}

/// Adjacency edge storage, written one level at a time.
pub trait AdjacencyRepository {
    /// Every stored edge.
    fn edges(&self) -> StoreResult<Vec<AdjacencyEdge>>;

    /// Edges whose source block is on `level`.
    fn edges_on_level(&self, level: i32) -> StoreResult<Vec<AdjacencyEdge>>;

    /// Delete every edge touching `level` and insert `edges` in their place,
    /// as one atomic unit.
    fn replace_level_edges(&self, level: i32, edges: Vec<AdjacencyEdge>) -> StoreResult<()>;
}

/// Read access to production rings.
pub trait RingRepository {
    /// Every ring, in ingestion order.
    fn rings(&self) -> StoreResult<Vec<ProductionRing>>;

    /// Active rings recorded against `drive` with the given status.
    fn rings_in_drive(&self, drive: &str, status: RingStatus) -> StoreResult<Vec<ProductionRing>>;

    /// Insert or replace rings by id.
    fn upsert_rings(&self, rings: Vec<ProductionRing>) -> StoreResult<()>;
}

/// Sequencing hints from upstream planning data.
pub trait SequenceLinkRepository {
    /// Every link.
    fn links(&self) -> StoreResult<Vec<SequenceLink>>;

    /// Links attached to `block`.
    fn links_for_block(&self, block: BlockId) -> StoreResult<Vec<SequenceLink>>;

    /// Append links.
    fn insert_links(&self, links: Vec<SequenceLink>) -> StoreResult<()>;
}

/// Cache of resolved mining directions.
pub trait DirectionRepository {
    /// Every cached record.
    fn directions(&self) -> StoreResult<Vec<MiningDirectionRecord>>;

    /// The cached record for one drive.
    fn direction(&self, drive: &str) -> StoreResult<Option<MiningDirectionRecord>>;

    /// Insert or replace records by drive name.
    fn save_directions(&self, records: Vec<MiningDirectionRecord>) -> StoreResult<()>;

    /// Drop cached records for the given drives.
    fn clear_directions(&self, drives: &[String]) -> StoreResult<()>;
}

/// Scenario and schedule entry storage.
pub trait ScenarioRepository {
    /// Persist a scenario together with all of its entries, atomically.
    fn commit_scenario(&self, scenario: Scenario, entries: Vec<ScheduleEntry>) -> StoreResult<()>;

    /// A committed scenario.
    fn scenario(&self, id: ScenarioId) -> StoreResult<Option<Scenario>>;

    /// Entries of a committed scenario in sequence order; empty if unknown.
    fn scenario_entries(&self, id: ScenarioId) -> StoreResult<Vec<ScheduleEntry>>;

    /// Delete a scenario and its entries.
    fn delete_scenario(&self, id: ScenarioId) -> StoreResult<()>;
}

/// Everything the simulator needs from storage.
pub trait MineStore:
    BlockRepository
    + AdjacencyRepository
    + RingRepository
    + SequenceLinkRepository
    + DirectionRepository
    + ScenarioRepository
    + Send
    + Sync
{
}

impl<T> MineStore for T where
    T: BlockRepository
        + AdjacencyRepository
        + RingRepository
        + SequenceLinkRepository
        + DirectionRepository
        + ScenarioRepository
        + Send
        + Sync
{
}
