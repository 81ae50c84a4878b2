//! In-memory [`MineStore`](crate::MineStore) implementation.
//!
//! All tables sit behind one `std::sync::RwLock`, so every write method is a
//! single critical section: readers see a level's edge set or a scenario's
//! entries either entirely before or entirely after a write, never half of
//! it. Used by tests and by the engine binary, which loads a dataset file
//! into it.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use ringflow_types::{
    AdjacencyEdge, Block, BlockId, MiningDirectionRecord, ProductionRing, RingStatus, Scenario,
    ScenarioId, ScheduleEntry, SequenceLink,
};
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::repository::{
    AdjacencyRepository, BlockRepository, DirectionRepository, RingRepository,
    ScenarioRepository, SequenceLinkRepository,
};

#[derive(Debug, Default)]
struct Tables {
    blocks: Vec<Block>,
    block_index: HashMap<BlockId, usize>,
    edges: Vec<AdjacencyEdge>,
    rings: Vec<ProductionRing>,
    links: Vec<SequenceLink>,
    directions: BTreeMap<String, MiningDirectionRecord>,
    scenarios: BTreeMap<ScenarioId, (Scenario, Vec<ScheduleEntry>)>,
}

impl Tables {
    fn block(&self, id: BlockId) -> Option<&Block> {
        self.block_index.get(&id).and_then(|&idx| self.blocks.get(idx))
    }

    fn level_of(&self, id: BlockId) -> Option<i32> {
        self.block(id).map(|b| b.level)
    }
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self, operation: &'static str) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables
            .read()
            .map_err(|_poisoned| StoreError::LockPoisoned { operation })
    }

    fn write(&self, operation: &'static str) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables
            .write()
            .map_err(|_poisoned| StoreError::LockPoisoned { operation })
    }
}

impl BlockRepository for MemoryStore {
    fn blocks(&self) -> StoreResult<Vec<Block>> {
        Ok(self.read("blocks")?.blocks.clone())
    }

    fn block(&self, id: BlockId) -> StoreResult<Option<Block>> {
        Ok(self.read("block")?.block(id).cloned())
    }

    fn blocks_on_level(&self, level: i32) -> StoreResult<Vec<Block>> {
        let tables = self.read("blocks_on_level")?;
        Ok(tables
            .blocks
            .iter()
            .filter(|b| b.level == level)
            .cloned()
            .collect())
    }

    fn blocks_in_drive(&self, drive: &str) -> StoreResult<Vec<Block>> {
        let tables = self.read("blocks_in_drive")?;
        Ok(tables
            .blocks
            .iter()
            .filter(|b| b.description == drive)
            .cloned()
            .collect())
    }

    fn levels(&self) -> StoreResult<Vec<i32>> {
        let tables = self.read("levels")?;
        let levels: BTreeSet<i32> = tables
            .blocks
            .iter()
            .filter(|b| b.is_active)
            .map(|b| b.level)
            .collect();
        Ok(levels.into_iter().collect())
    }

    fn upsert_blocks(&self, blocks: Vec<Block>) -> StoreResult<Vec<i32>> {
        let mut tables = self.write("upsert_blocks")?;
        let mut touched = BTreeSet::new();
        for block in blocks {
            if let Some(old_level) = tables.level_of(block.id) {
                touched.insert(old_level);
            }
            touched.insert(block.level);
            match tables.block_index.get(&block.id).copied() {
                Some(idx) => {
                    if let Some(slot) = tables.blocks.get_mut(idx) {
                        *slot = block;
                    }
                }
                None => {
                    let idx = tables.blocks.len();
                    tables.block_index.insert(block.id, idx);
                    tables.blocks.push(block);
                }
            }
        }
        debug!(levels = ?touched, "blocks upserted");
        Ok(touched.into_iter().collect())
    }
}

impl AdjacencyRepository for MemoryStore {
    fn edges(&self) -> StoreResult<Vec<AdjacencyEdge>> {
        Ok(self.read("edges")?.edges.clone())
    }

    fn edges_on_level(&self, level: i32) -> StoreResult<Vec<AdjacencyEdge>> {
        let tables = self.read("edges_on_level")?;
        Ok(tables
            .edges
            .iter()
            .filter(|e| tables.level_of(e.block) == Some(level))
            .copied()
            .collect())
    }

    fn replace_level_edges(&self, level: i32, edges: Vec<AdjacencyEdge>) -> StoreResult<()> {
        let mut tables = self.write("replace_level_edges")?;

        // Validate before touching anything so a rejected rebuild leaves the
        // previous edge set intact.
        for edge in &edges {
            for endpoint in [edge.block, edge.adjacent_block] {
                match tables.level_of(endpoint) {
                    Some(l) if l == level => {}
                    Some(_) => return Err(StoreError::ForeignLevel { level, block: endpoint }),
                    None => return Err(StoreError::BlockNotFound(endpoint)),
                }
            }
        }

        let old_edges = std::mem::take(&mut tables.edges);
        let mut kept: Vec<AdjacencyEdge> = old_edges
            .into_iter()
            .filter(|e| {
                tables.level_of(e.block) != Some(level)
                    && tables.level_of(e.adjacent_block) != Some(level)
            })
            .collect();
        let retained = kept.len();
        kept.extend(edges);
        debug!(
            level,
            inserted = kept.len().saturating_sub(retained),
            "level edges replaced"
        );
        tables.edges = kept;
        Ok(())
    }
}

impl RingRepository for MemoryStore {
    fn rings(&self) -> StoreResult<Vec<ProductionRing>> {
        Ok(self.read("rings")?.rings.clone())
    }

    fn rings_in_drive(&self, drive: &str, status: RingStatus) -> StoreResult<Vec<ProductionRing>> {
        let tables = self.read("rings_in_drive")?;
        Ok(tables
            .rings
            .iter()
            .filter(|r| r.is_active && r.status == status && r.oredrive == drive)
            .cloned()
            .collect())
    }

    fn upsert_rings(&self, rings: Vec<ProductionRing>) -> StoreResult<()> {
        let mut tables = self.write("upsert_rings")?;
        for ring in rings {
            if let Some(slot) = tables.rings.iter_mut().find(|r| r.id == ring.id) {
                *slot = ring;
            } else {
                tables.rings.push(ring);
            }
        }
        Ok(())
    }
}

impl SequenceLinkRepository for MemoryStore {
    fn links(&self) -> StoreResult<Vec<SequenceLink>> {
        Ok(self.read("links")?.links.clone())
    }

    fn links_for_block(&self, block: BlockId) -> StoreResult<Vec<SequenceLink>> {
        let tables = self.read("links_for_block")?;
        Ok(tables
            .links
            .iter()
            .filter(|l| l.block == block)
            .copied()
            .collect())
    }

    fn insert_links(&self, links: Vec<SequenceLink>) -> StoreResult<()> {
        self.write("insert_links")?.links.extend(links);
        Ok(())
    }
}

impl DirectionRepository for MemoryStore {
    fn directions(&self) -> StoreResult<Vec<MiningDirectionRecord>> {
        Ok(self.read("directions")?.directions.values().cloned().collect())
    }

    fn direction(&self, drive: &str) -> StoreResult<Option<MiningDirectionRecord>> {
        Ok(self.read("direction")?.directions.get(drive).cloned())
    }

    fn save_directions(&self, records: Vec<MiningDirectionRecord>) -> StoreResult<()> {
        let mut tables = self.write("save_directions")?;
        for record in records {
            tables.directions.insert(record.description.clone(), record);
        }
        Ok(())
    }

    fn clear_directions(&self, drives: &[String]) -> StoreResult<()> {
        let mut tables = self.write("clear_directions")?;
        for drive in drives {
            tables.directions.remove(drive);
        }
        Ok(())
    }
}

impl ScenarioRepository for MemoryStore {
    fn commit_scenario(&self, scenario: Scenario, entries: Vec<ScheduleEntry>) -> StoreResult<()> {
        let mut tables = self.write("commit_scenario")?;
        if tables.scenarios.contains_key(&scenario.id) {
            return Err(StoreError::DuplicateScenario(scenario.id));
        }
        debug!(scenario = %scenario.id, entries = entries.len(), "scenario committed");
        tables.scenarios.insert(scenario.id, (scenario, entries));
        Ok(())
    }

    fn scenario(&self, id: ScenarioId) -> StoreResult<Option<Scenario>> {
        Ok(self
            .read("scenario")?
            .scenarios
            .get(&id)
            .map(|(scenario, _)| scenario.clone()))
    }

    fn scenario_entries(&self, id: ScenarioId) -> StoreResult<Vec<ScheduleEntry>> {
        let tables = self.read("scenario_entries")?;
        let mut entries = tables
            .scenarios
            .get(&id)
            .map(|(_, entries)| entries.clone())
            .unwrap_or_default();
        entries.sort_by_key(|e| e.sequence);
        Ok(entries)
    }

    fn delete_scenario(&self, id: ScenarioId) -> StoreResult<()> {
        let mut tables = self.write("delete_scenario")?;
        tables
            .scenarios
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::ScenarioNotFound(id))
    }
}
