//! Per-level adjacency builder.
//!
//! For every active block on a level, each of the eight bearing slots keeps
//! the single nearest other active block within the search radius that
//! lies on that bearing. Edges are always recomputed for a whole level and
//! written back in one atomic replacement.

use ringflow_store::{AdjacencyRepository, BlockRepository, DirectionRepository};
use ringflow_types::{AdjacencyEdge, Bearing, Block};
use tracing::{debug, info};

use crate::error::GraphError;
use crate::geometry;

/// Default search radius, in mine distance units.
pub const DEFAULT_SEARCH_RADIUS: f64 = 20.0;

/// Outcome of rebuilding one level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelRebuild {
    /// The level that was rebuilt.
    pub level: i32,
    /// Active blocks considered.
    pub blocks: usize,
    /// Edges written.
    pub edges: usize,
}

/// Compute the nearest-per-bearing edge set over `blocks`.
///
/// Inactive blocks are skipped. A candidate exactly at `search_radius` is
/// adjacent. Candidates that coincide with the source in plan have no
/// bearing and are skipped. On equal distance the first candidate in input
/// order keeps the slot. Edges are emitted per source block in input order,
/// clockwise from north.
pub fn compute_level_edges(blocks: &[Block], search_radius: f64) -> Vec<AdjacencyEdge> {
    let active: Vec<&Block> = blocks.iter().filter(|b| b.is_active).collect();
    let mut edges = Vec::new();

    for source in &active {
        let mut slots: [Option<(&Block, f64)>; 8] = [None; 8];
        for candidate in &active {
            if candidate.id == source.id {
                continue;
            }
            let distance = geometry::planar_distance(&source.position, &candidate.position);
            if distance > search_radius {
                continue;
            }
            let Some(bearing) = geometry::bearing(&source.position, &candidate.position) else {
                continue;
            };
            if let Some(slot) = slots.get_mut(bearing.ordinal()) {
                let closer = slot.is_none_or(|(_, kept)| distance < kept);
                if closer {
                    *slot = Some((candidate, distance));
                }
            }
        }

        for (bearing, slot) in Bearing::ALL.iter().zip(slots) {
            if let Some((target, _)) = slot {
                edges.push(AdjacencyEdge {
                    block: source.id,
                    adjacent_block: target.id,
                    bearing: *bearing,
                });
            }
        }
    }

    edges
}

/// Recompute and atomically replace the edges of one level.
///
/// Cached mining directions of every drive on the level are dropped, since
/// they were resolved against the old edges.
///
/// # Errors
///
/// Returns [`GraphError::Store`] if reading blocks or writing edges fails.
pub fn rebuild_level<S>(store: &S, level: i32, search_radius: f64) -> Result<LevelRebuild, GraphError>
where
    S: BlockRepository + AdjacencyRepository + DirectionRepository + ?Sized,
{
    let blocks = store.blocks_on_level(level)?;
    let edges = compute_level_edges(&blocks, search_radius);
    let rebuild = LevelRebuild {
        level,
        blocks: blocks.iter().filter(|b| b.is_active).count(),
        edges: edges.len(),
    };
    store.replace_level_edges(level, edges)?;

    let mut drives: Vec<String> = blocks.into_iter().map(|b| b.description).collect();
    drives.sort_unstable();
    drives.dedup();
    store.clear_directions(&drives)?;

    debug!(
        level,
        blocks = rebuild.blocks,
        edges = rebuild.edges,
        drives = drives.len(),
        "Rebuilt level adjacency"
    );
    Ok(rebuild)
}

/// Rebuild several levels, one atomic replacement each.
///
/// Stops at the first failure; levels already rebuilt stay rebuilt.
///
/// # Errors
///
/// Returns the first error of [`rebuild_level`].
pub fn rebuild_levels<S>(
    store: &S,
    levels: &[i32],
    search_radius: f64,
) -> Result<Vec<LevelRebuild>, GraphError>
where
    S: BlockRepository + AdjacencyRepository + DirectionRepository + ?Sized,
{
    levels
        .iter()
        .map(|&level| rebuild_level(store, level, search_radius))
        .collect()
}

/// Rebuild every level that holds an active block.
///
/// # Errors
///
/// Returns [`GraphError::Store`] if listing levels fails, or the first
/// error of [`rebuild_level`].
pub fn rebuild_mine<S>(store: &S, search_radius: f64) -> Result<Vec<LevelRebuild>, GraphError>
where
    S: BlockRepository + AdjacencyRepository + DirectionRepository + ?Sized,
{
    let levels = store.levels()?;
    let rebuilt = rebuild_levels(store, &levels, search_radius)?;
    let edges: usize = rebuilt.iter().map(|r| r.edges).sum();
    info!(levels = rebuilt.len(), edges, "Rebuilt mine adjacency");
    Ok(rebuilt)
}
