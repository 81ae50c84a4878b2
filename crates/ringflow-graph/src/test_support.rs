//! Fixtures shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use std::collections::BTreeSet;

use ringflow_types::{Block, Position};
use rust_decimal::Decimal;

use crate::adjacency::{DEFAULT_SEARCH_RADIUS, compute_level_edges};
use crate::block_graph::BlockGraph;

/// An active block at integer planar coordinates.
pub fn block(level: i32, drive: &str, x: i64, y: i64) -> Block {
    Block::new(
        level,
        drive,
        format!("{drive}-{x}-{y}"),
        Position::new(Decimal::from(x), Decimal::from(y), Decimal::ZERO),
    )
}

/// `count` blocks along the x axis at height `y`, `spacing` apart from x = 0.
pub fn row(level: i32, drive: &str, y: i64, count: i64, spacing: i64) -> Vec<Block> {
    (0..count)
        .map(|i| block(level, drive, i * spacing, y))
        .collect()
}

/// Build a graph over `blocks`, computing adjacency level by level.
pub fn graph_of(blocks: &[Block]) -> BlockGraph {
    let levels: BTreeSet<i32> = blocks.iter().map(|b| b.level).collect();
    let mut edges = Vec::new();
    for level in levels {
        let on_level: Vec<Block> = blocks.iter().filter(|b| b.level == level).cloned().collect();
        edges.extend(compute_level_edges(&on_level, DEFAULT_SEARCH_RADIUS));
    }
    BlockGraph::from_parts(blocks.to_vec(), &edges, &[]).unwrap()
}
