//! Block adjacency graph and navigation for the ringflow simulator.
//!
//! Leaves first:
//!
//! - [`geometry`] -- Bearing classification, opposites, tolerance sets.
//! - [`adjacency`] -- Per-level nearest-neighbour edge builder.
//! - [`block_graph`] -- [`BlockGraph`], an arena snapshot of blocks and edges.
//! - [`navigator`] -- [`Navigator`], stepping and walking along drives.
//! - [`direction`] -- Mining direction resolution and its cache.
//! - [`error`] -- [`GraphError`].

pub mod adjacency;
pub mod block_graph;
pub mod direction;
pub mod error;
pub mod geometry;
pub mod navigator;

#[cfg(test)]
mod test_support;

pub use adjacency::{
    DEFAULT_SEARCH_RADIUS, LevelRebuild, compute_level_edges, rebuild_level, rebuild_levels,
    rebuild_mine,
};
pub use block_graph::BlockGraph;
pub use direction::{DirectionCache, DirectionRefresh, refresh_directions, resolve_drive};
pub use error::GraphError;
pub use navigator::{DEFAULT_MAX_WALK_STEPS, DriveContact, Navigator, Walk};
