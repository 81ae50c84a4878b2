//! Consumption tally: rings and metres between two fronts of a drive.

use core::ops::Add;

use ringflow_graph::Navigator;
use ringflow_types::{Bearing, BlockId};
use rust_decimal::Decimal;

use crate::rings::RingIndex;

/// Rings and metres consumed over a span of blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Blocks visited.
    pub blocks: u32,
    /// Rings consumed; a block with no rings counts as one.
    pub rings: u32,
    /// Metres consumed; a block with no rings counts the default metres.
    pub metres: Decimal,
    /// Blocks that had no rings.
    pub placeholder_blocks: u32,
}

impl Tally {
    fn count_block(&mut self, rings: &RingIndex, block: BlockId, default_metres: Decimal) {
        self.blocks = self.blocks.saturating_add(1);
        match rings.block(block) {
            Some(totals) if totals.count > 0 => {
                self.rings = self.rings.saturating_add(totals.count);
                self.metres = self.metres.saturating_add(totals.metres);
            }
            _ => {
                self.rings = self.rings.saturating_add(1);
                self.metres = self.metres.saturating_add(default_metres);
                self.placeholder_blocks = self.placeholder_blocks.saturating_add(1);
            }
        }
    }
}

impl Add for Tally {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            blocks: self.blocks.saturating_add(rhs.blocks),
            rings: self.rings.saturating_add(rhs.rings),
            metres: self.metres.saturating_add(rhs.metres),
            placeholder_blocks: self.placeholder_blocks.saturating_add(rhs.placeholder_blocks),
        }
    }
}

/// Tally the blocks after `from` up to and including `to`, walking along
/// `direction`.
///
/// With no `from` the walk starts at `seed` (the drive's first block),
/// which is included. Returns `None` when the walk cannot reach `to`.
pub fn tally_span(
    navigator: &Navigator<'_>,
    rings: &RingIndex,
    from: Option<BlockId>,
    to: BlockId,
    direction: Bearing,
    seed: BlockId,
    default_metres: Decimal,
) -> Option<Tally> {
    let start = from.unwrap_or(seed);
    let walk = navigator.walk(start, to, direction);
    if !walk.reached {
        return None;
    }
    let mut tally = Tally::default();
    if from.is_none() {
        tally.count_block(rings, seed, default_metres);
    }
    for block in walk.blocks {
        tally.count_block(rings, block, default_metres);
    }
    Some(tally)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::arithmetic_side_effects
)]
mod tests {
    use ringflow_graph::{
        BlockGraph, DEFAULT_MAX_WALK_STEPS, DEFAULT_SEARCH_RADIUS, compute_level_edges,
    };
    use ringflow_types::{Block, Position, ProductionRing, RingId, RingStatus};
    use rust_decimal_macros::dec;

    use super::*;

    fn drive(count: i64) -> Vec<Block> {
        (0..count)
            .map(|i| {
                Block::new(
                    5,
                    "A1",
                    format!("A1-{i}"),
                    Position::new(Decimal::from(i * 5), Decimal::ZERO, Decimal::ZERO),
                )
            })
            .collect()
    }

    fn graph(blocks: &[Block]) -> BlockGraph {
        let edges = compute_level_edges(blocks, DEFAULT_SEARCH_RADIUS);
        BlockGraph::from_parts(blocks.to_vec(), &edges, &[]).unwrap()
    }

    fn east(
        nav: &Navigator<'_>,
        rings: &RingIndex,
        from: Option<&Block>,
        to: &Block,
        seed: &Block,
    ) -> Option<Tally> {
        tally_span(nav, rings, from.map(|b| b.id), to.id, Bearing::East, seed.id, dec!(165))
    }

    fn ring(block: BlockId, metres: Decimal) -> ProductionRing {
        ProductionRing {
            id: RingId::new(),
            block: Some(block),
            oredrive: "A1".to_owned(),
            level: 5,
            status: RingStatus::Designed,
            drilled_metres: Some(metres),
            is_active: true,
        }
    }

    #[test]
    fn blocks_with_rings_use_their_totals_and_others_the_default() {
        let blocks = drive(4);
        let graph = graph(&blocks);
        let nav = Navigator::new(&graph, DEFAULT_MAX_WALK_STEPS);
        let rings = RingIndex::from_rings(&[
            ring(blocks[1].id, dec!(100)),
            ring(blocks[1].id, dec!(50)),
        ]);

        let tally = east(&nav, &rings, Some(&blocks[0]), &blocks[2], &blocks[0]).unwrap();
        assert_eq!(tally.blocks, 2);
        assert_eq!(tally.rings, 3);
        assert_eq!(tally.metres, dec!(315));
        assert_eq!(tally.placeholder_blocks, 1);
    }

    #[test]
    fn missing_start_seeds_at_the_first_block_inclusive() {
        let blocks = drive(4);
        let graph = graph(&blocks);
        let nav = Navigator::new(&graph, DEFAULT_MAX_WALK_STEPS);
        let rings = RingIndex::default();

        let tally = east(&nav, &rings, None, &blocks[2], &blocks[0]).unwrap();
        assert_eq!(tally.blocks, 3);
        assert_eq!(tally.metres, dec!(495));

        let only_seed = east(&nav, &rings, None, &blocks[0], &blocks[0]).unwrap();
        assert_eq!(only_seed.blocks, 1);
    }

    #[test]
    fn same_front_tallies_nothing() {
        let blocks = drive(3);
        let graph = graph(&blocks);
        let nav = Navigator::new(&graph, DEFAULT_MAX_WALK_STEPS);
        let rings = RingIndex::default();
        let tally = east(&nav, &rings, Some(&blocks[1]), &blocks[1], &blocks[0]).unwrap();
        assert_eq!(tally, Tally::default());
    }

    #[test]
    fn unreachable_target_is_reported() {
        let blocks = drive(3);
        let graph = graph(&blocks);
        let nav = Navigator::new(&graph, DEFAULT_MAX_WALK_STEPS);
        let rings = RingIndex::default();
        let backwards = east(&nav, &rings, Some(&blocks[2]), &blocks[0], &blocks[0]);
        assert!(backwards.is_none());
    }

    #[test]
    fn tallies_add_up_over_any_split_point() {
        let blocks = drive(8);
        let graph = graph(&blocks);
        let nav = Navigator::new(&graph, DEFAULT_MAX_WALK_STEPS);
        let rings = RingIndex::from_rings(&[
            ring(blocks[2].id, dec!(12.5)),
            ring(blocks[5].id, dec!(40)),
            ring(blocks[5].id, dec!(41)),
        ]);
        let span = |from: usize, to: usize| {
            east(&nav, &rings, Some(&blocks[from]), &blocks[to], &blocks[0]).unwrap()
        };

        let whole = span(0, 7);
        for mid in 0..=7 {
            assert_eq!(span(0, mid) + span(mid, 7), whole, "split at {mid}");
        }
    }
}
