//! Arena-backed snapshot of blocks, adjacency edges, and sequencing hints.
//!
//! Blocks live in a dense `Vec` with a `BlockId -> index` map, and each
//! block owns one slot per bearing for its outbound edge, so
//! "the neighbour of `b` on bearing `d`" is two array lookups. Only active
//! blocks enter the arena; inactive blocks are invisible to navigation.
//!
//! The graph is read-only once built. Rebuilding adjacency means writing
//! new edges to the store and loading a fresh snapshot.

use std::collections::{BTreeMap, HashMap};

use ringflow_store::{AdjacencyRepository, BlockRepository, SequenceLinkRepository};
use ringflow_types::{AdjacencyEdge, Bearing, Block, BlockId, LinkRole, SequenceLink};
use tracing::debug;

use crate::error::GraphError;
use crate::geometry;

/// Outbound edge slots of one block, indexed by [`Bearing::ordinal`].
type Slots = [Option<usize>; 8];

/// Read-only adjacency graph over the active blocks of a mine.
#[derive(Debug, Clone, Default)]
pub struct BlockGraph {
    /// Active blocks in ingestion order.
    blocks: Vec<Block>,
    /// Planar coordinates per arena index.
    points: Vec<(f64, f64)>,
    /// Block id to arena index.
    index: HashMap<BlockId, usize>,
    /// Outbound edge per block and bearing.
    edges: Vec<Slots>,
    /// Sequencing hints per block.
    links: Vec<Vec<(usize, LinkRole)>>,
    /// Drive name to arena indices, ingestion order.
    drives: BTreeMap<String, Vec<usize>>,
    /// External identifier to arena indices, ingestion order.
    external: HashMap<String, Vec<usize>>,
}

impl BlockGraph {
    /// Build a graph from raw rows.
    ///
    /// Inactive blocks are dropped. Links whose endpoints are not active
    /// blocks are ignored, since they are optional hints.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DanglingEdge`] if an edge touches a block that
    /// is not in the arena, or [`GraphError::DuplicateEdge`] if two edges
    /// share a source block and bearing.
    pub fn from_parts(
        blocks: Vec<Block>,
        edges: &[AdjacencyEdge],
        links: &[SequenceLink],
    ) -> Result<Self, GraphError> {
        let mut graph = Self::default();
        for block in blocks.into_iter().filter(|b| b.is_active) {
            graph.push_block(block);
        }

        for edge in edges {
            let from = graph.require(edge.block, edge.block)?;
            let to = graph.require(edge.block, edge.adjacent_block)?;
            let slot = graph
                .edges
                .get_mut(from)
                .and_then(|slots| slots.get_mut(edge.bearing.ordinal()))
                .ok_or(GraphError::BlockNotFound(edge.block))?;
            if slot.is_some() {
                return Err(GraphError::DuplicateEdge {
                    block: edge.block,
                    bearing: edge.bearing,
                });
            }
            *slot = Some(to);
        }

        let mut skipped: usize = 0;
        for link in links {
            match (graph.index.get(&link.block), graph.index.get(&link.linked_block)) {
                (Some(&from), Some(&to)) => {
                    if let Some(list) = graph.links.get_mut(from) {
                        list.push((to, link.role));
                    }
                }
                _ => skipped = skipped.saturating_add(1),
            }
        }
        if skipped > 0 {
            debug!(skipped, "Ignored sequence links to unknown or inactive blocks");
        }

        Ok(graph)
    }

    /// Load a snapshot of every block, edge, and link from a store.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::Store`] if a read fails, or any error of
    /// [`BlockGraph::from_parts`].
    pub fn load<S>(store: &S) -> Result<Self, GraphError>
    where
        S: BlockRepository + AdjacencyRepository + SequenceLinkRepository + ?Sized,
    {
        let blocks = store.blocks()?;
        let edges = store.edges()?;
        let links = store.links()?;
        let graph = Self::from_parts(blocks, &edges, &links)?;
        debug!(
            blocks = graph.len(),
            edges = graph.edge_count(),
            drives = graph.drives.len(),
            "Loaded block graph"
        );
        Ok(graph)
    }

    fn push_block(&mut self, block: Block) {
        let idx = self.blocks.len();
        self.index.insert(block.id, idx);
        self.points.push(geometry::planar(&block.position));
        self.edges.push([None; 8]);
        self.links.push(Vec::new());
        self.drives
            .entry(block.description.clone())
            .or_default()
            .push(idx);
        self.external
            .entry(block.blastsolids_id.clone())
            .or_default()
            .push(idx);
        self.blocks.push(block);
    }

    fn require(&self, source: BlockId, id: BlockId) -> Result<usize, GraphError> {
        self.index
            .get(&id)
            .copied()
            .ok_or(GraphError::DanglingEdge {
                block: source,
                missing: id,
            })
    }

    fn at(&self, idx: usize) -> Option<&Block> {
        self.blocks.get(idx)
    }

    // -------------------------------------------------------------------
    // Blocks
    // -------------------------------------------------------------------

    /// Number of active blocks.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Whether the graph holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Whether `id` is an active block of the graph.
    pub fn contains(&self, id: BlockId) -> bool {
        self.index.contains_key(&id)
    }

    /// Look up a block.
    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.index.get(&id).and_then(|&idx| self.at(idx))
    }

    /// Iterate over every active block in ingestion order.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.blocks.iter()
    }

    /// Drive name of a block.
    pub fn drive_of(&self, id: BlockId) -> Option<&str> {
        self.block(id).map(|b| b.description.as_str())
    }

    /// Names of every drive with at least one active block, sorted.
    pub fn drive_names(&self) -> impl Iterator<Item = &str> {
        self.drives.keys().map(String::as_str)
    }

    /// Active blocks of a drive in ingestion order. Empty for unknown drives.
    pub fn blocks_in_drive<'a>(&'a self, drive: &str) -> impl Iterator<Item = &'a Block> + 'a {
        self.drives
            .get(drive)
            .into_iter()
            .flatten()
            .filter_map(|&idx| self.at(idx))
    }

    /// Resolve an external identifier to a block.
    ///
    /// When several active blocks carry the identifier, one on `level` is
    /// preferred, then the first ingested.
    pub fn resolve_external(&self, blastsolids_id: &str, level: Option<i32>) -> Option<&Block> {
        let candidates: Vec<&Block> = self
            .external
            .get(blastsolids_id)?
            .iter()
            .filter_map(|&idx| self.at(idx))
            .collect();
        level
            .and_then(|lvl| candidates.iter().copied().find(|b| b.level == lvl))
            .or_else(|| candidates.first().copied())
    }

    // -------------------------------------------------------------------
    // Edges and links
    // -------------------------------------------------------------------

    /// Total number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges
            .iter()
            .map(|slots| slots.iter().flatten().count())
            .sum()
    }

    /// The neighbour of `id` on `bearing`, if an edge exists.
    pub fn neighbour(&self, id: BlockId, bearing: Bearing) -> Option<&Block> {
        let idx = *self.index.get(&id)?;
        let target = (*self.edges.get(idx)?.get(bearing.ordinal())?)?;
        self.at(target)
    }

    /// All outbound edges of `id`, clockwise from north.
    pub fn neighbours(&self, id: BlockId) -> Vec<(Bearing, &Block)> {
        Bearing::ALL
            .iter()
            .filter_map(|&bearing| self.neighbour(id, bearing).map(|b| (bearing, b)))
            .collect()
    }

    /// Sequencing hints attached to `id`, with the linked block resolved.
    pub fn links(&self, id: BlockId) -> Vec<(&Block, LinkRole)> {
        self.index
            .get(&id)
            .and_then(|&idx| self.links.get(idx))
            .map(|list| {
                list.iter()
                    .filter_map(|&(target, role)| self.at(target).map(|b| (b, role)))
                    .collect()
            })
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------
    // Measurement
    // -------------------------------------------------------------------

    /// Planar distance between two blocks.
    pub fn distance(&self, a: BlockId, b: BlockId) -> Option<f64> {
        let (ax, ay) = self.point(a)?;
        let (bx, by) = self.point(b)?;
        Some((bx - ax).hypot(by - ay))
    }

    /// Bearing of `to` as seen from `from`. `None` if either is unknown or
    /// the two coincide in plan.
    pub fn bearing_between(&self, from: BlockId, to: BlockId) -> Option<Bearing> {
        let (fx, fy) = self.point(from)?;
        let (tx, ty) = self.point(to)?;
        geometry::offset_bearing(tx - fx, ty - fy)
    }

    /// Signed distance of a block along `bearing`.
    pub fn advance(&self, id: BlockId, bearing: Bearing) -> Option<f64> {
        self.block(id)
            .map(|b| geometry::projection(&b.position, bearing))
    }

    fn point(&self, id: BlockId) -> Option<(f64, f64)> {
        self.index
            .get(&id)
            .and_then(|&idx| self.points.get(idx))
            .copied()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use ringflow_types::Position;
    use rust_decimal::Decimal;

    use super::*;

    fn block(drive: &str, ext: &str, x: i64, y: i64) -> Block {
        Block::new(
            5,
            drive,
            ext,
            Position::new(Decimal::from(x), Decimal::from(y), Decimal::ZERO),
        )
    }

    #[test]
    fn inactive_blocks_are_left_out() {
        let a = block("A1", "a", 0, 0);
        let mut b = block("A1", "b", 10, 0);
        b.is_active = false;
        let graph = BlockGraph::from_parts(vec![a.clone(), b.clone()], &[], &[]).unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.contains(a.id));
        assert!(!graph.contains(b.id));
        assert!(graph.resolve_external("b", None).is_none());
    }

    #[test]
    fn duplicate_edge_is_rejected() {
        let a = block("A1", "a", 0, 0);
        let b = block("A1", "b", 10, 0);
        let c = block("A1", "c", 20, 0);
        let edges = [
            AdjacencyEdge { block: a.id, adjacent_block: b.id, bearing: Bearing::East },
            AdjacencyEdge { block: a.id, adjacent_block: c.id, bearing: Bearing::East },
        ];
        let result = BlockGraph::from_parts(vec![a, b, c], &edges, &[]);
        assert!(matches!(result, Err(GraphError::DuplicateEdge { bearing: Bearing::East, .. })));
    }

    #[test]
    fn edge_to_unknown_block_is_rejected() {
        let a = block("A1", "a", 0, 0);
        let ghost = BlockId::new();
        let edges = [AdjacencyEdge { block: a.id, adjacent_block: ghost, bearing: Bearing::North }];
        let result = BlockGraph::from_parts(vec![a], &edges, &[]);
        assert!(matches!(result, Err(GraphError::DanglingEdge { missing, .. }) if missing == ghost));
    }

    #[test]
    fn neighbour_lookup_and_measurement() {
        let a = block("A1", "a", 0, 0);
        let b = block("A1", "b", 3, 4);
        let edges = [AdjacencyEdge { block: a.id, adjacent_block: b.id, bearing: Bearing::NorthEast }];
        let graph = BlockGraph::from_parts(vec![a.clone(), b.clone()], &edges, &[]).unwrap();
        assert_eq!(graph.neighbour(a.id, Bearing::NorthEast).map(|n| n.id), Some(b.id));
        assert!(graph.neighbour(a.id, Bearing::East).is_none());
        assert_eq!(graph.neighbours(b.id).len(), 0);
        assert!((graph.distance(a.id, b.id).unwrap() - 5.0).abs() < 1e-12);
        assert_eq!(graph.bearing_between(a.id, b.id), Some(Bearing::NorthEast));
        assert_eq!(graph.edge_count(), 1);
    }

    #[test]
    fn external_lookup_prefers_matching_level() {
        let a = block("A1", "dup", 0, 0);
        let mut b = block("B1", "dup", 0, 0);
        b.level = 7;
        let graph = BlockGraph::from_parts(vec![a.clone(), b.clone()], &[], &[]).unwrap();
        assert_eq!(graph.resolve_external("dup", Some(7)).map(|x| x.id), Some(b.id));
        assert_eq!(graph.resolve_external("dup", Some(9)).map(|x| x.id), Some(a.id));
        assert_eq!(graph.resolve_external("dup", None).map(|x| x.id), Some(a.id));
    }

    #[test]
    fn links_to_inactive_blocks_are_ignored() {
        let a = block("A1", "a", 0, 0);
        let b = block("A1", "b", 10, 0);
        let links = [
            SequenceLink { block: a.id, linked_block: b.id, role: LinkRole::Successor },
            SequenceLink { block: a.id, linked_block: BlockId::new(), role: LinkRole::Successor },
        ];
        let graph = BlockGraph::from_parts(vec![a.clone(), b.clone()], &[], &links).unwrap();
        let found = graph.links(a.id);
        assert_eq!(found.len(), 1);
        assert_eq!(found.first().map(|(blk, _)| blk.id), Some(b.id));
    }

    #[test]
    fn drives_keep_ingestion_order() {
        let a = block("A1", "a", 20, 0);
        let b = block("A1", "b", 0, 0);
        let c = block("B1", "c", 0, 50);
        let graph = BlockGraph::from_parts(vec![a.clone(), b.clone(), c], &[], &[]).unwrap();
        let ids: Vec<BlockId> = graph.blocks_in_drive("A1").map(|x| x.id).collect();
        assert_eq!(ids, vec![a.id, b.id]);
        assert_eq!(graph.drive_names().collect::<Vec<_>>(), vec!["A1", "B1"]);
        assert_eq!(graph.blocks_in_drive("Z9").count(), 0);
    }
}
