//! Traversal primitives over a [`BlockGraph`].
//!
//! Every step stays inside the drive it started in: an edge into a
//! neighbouring drive is never followed, only reported through the
//! cross-drive lookups. Walks are bounded by a step cap and a visited set,
//! so a malformed graph cannot make them loop.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use ringflow_types::{Bearing, BlockId};

use crate::block_graph::BlockGraph;
use crate::geometry;

/// Default cap on steps taken by a single walk.
pub const DEFAULT_MAX_WALK_STEPS: usize = 500;

/// Projections closer than this are treated as level with each other.
const ADVANCE_EPSILON: f64 = 1e-9;

/// Blocks visited while walking from one block toward another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Walk {
    /// Visited blocks in order, excluding the start.
    pub blocks: Vec<BlockId>,
    /// Whether the walk ended on the requested target.
    pub reached: bool,
}

/// The closest pair of blocks between a drive and one neighbouring drive.
#[derive(Debug, Clone, PartialEq)]
pub struct DriveContact {
    /// The neighbouring drive.
    pub drive: String,
    /// Boundary block on the queried drive.
    pub block: BlockId,
    /// Boundary block on the neighbouring drive.
    pub neighbour_block: BlockId,
    /// Planar distance between the two.
    pub distance: f64,
}

/// Step, walk, and look up blocks along drives.
#[derive(Debug, Clone, Copy)]
pub struct Navigator<'g> {
    graph: &'g BlockGraph,
    max_steps: usize,
}

impl<'g> Navigator<'g> {
    /// Create a navigator over `graph` whose walks stop after `max_steps`.
    pub const fn new(graph: &'g BlockGraph, max_steps: usize) -> Self {
        Self { graph, max_steps }
    }

    /// The graph being navigated.
    pub const fn graph(&self) -> &'g BlockGraph {
        self.graph
    }

    /// The next block of the same drive roughly in `direction`.
    ///
    /// The edge on `direction` itself is tried first, then the two
    /// neighbouring bearings. An edge whose target belongs to another drive
    /// is never taken.
    pub fn step_next(&self, block: BlockId, direction: Bearing) -> Option<BlockId> {
        let drive = self.graph.drive_of(block)?;
        geometry::tolerance(direction).iter().find_map(|&bearing| {
            self.graph
                .neighbour(block, bearing)
                .filter(|n| n.description == drive)
                .map(|n| n.id)
        })
    }

    /// The previous block of the same drive, against `direction`.
    pub fn step_previous(&self, block: BlockId, direction: Bearing) -> Option<BlockId> {
        self.step_next(block, geometry::opposite(direction))
    }

    /// The block about `distance` ahead of `block` along `direction`.
    ///
    /// Steps forward, measuring straight-line distance from `block`, and
    /// returns the first block at or beyond `distance`. If the drive ends
    /// first, the farthest block reached is returned. `None` means no step
    /// was possible at all, or `distance` is not positive: the front is
    /// already at the end of the drive.
    pub fn step_distance(&self, block: BlockId, direction: Bearing, distance: f64) -> Option<BlockId> {
        if distance.is_nan() || distance <= 0.0 {
            return None;
        }
        let mut visited = HashSet::from([block]);
        let mut current = block;
        let mut farthest = None;
        for _ in 0..self.max_steps {
            let Some(next) = self.step_next(current, direction) else {
                break;
            };
            if !visited.insert(next) {
                break;
            }
            let travelled = self.graph.distance(block, next).unwrap_or_default();
            if travelled >= distance {
                return Some(next);
            }
            farthest = Some(next);
            current = next;
        }
        farthest
    }

    /// Walk from `from` toward `to` along `direction`.
    ///
    /// The walk stops on `to`, at the end of the drive, on a revisit, or at
    /// the step cap. Walking from a block to itself visits nothing and
    /// counts as reached.
    pub fn walk(&self, from: BlockId, to: BlockId, direction: Bearing) -> Walk {
        let mut walk = Walk {
            blocks: Vec::new(),
            reached: from == to,
        };
        if walk.reached {
            return walk;
        }
        let mut visited = HashSet::from([from]);
        let mut current = from;
        for _ in 0..self.max_steps {
            let Some(next) = self.step_next(current, direction) else {
                break;
            };
            if !visited.insert(next) {
                break;
            }
            walk.blocks.push(next);
            if next == to {
                walk.reached = true;
                break;
            }
            current = next;
        }
        walk
    }

    /// The block of `drive` farthest against `direction`.
    pub fn first_block_of_drive(&self, drive: &str, direction: Bearing) -> Option<BlockId> {
        self.extreme_block(drive, geometry::opposite(direction))
    }

    /// The block of `drive` farthest along `direction`.
    pub fn last_block_of_drive(&self, drive: &str, direction: Bearing) -> Option<BlockId> {
        self.extreme_block(drive, direction)
    }

    /// Scan the drive once, moving the candidate whenever the next block
    /// lies roughly in `direction` from it. Comparing against the tolerance
    /// cone instead of raw distance keeps zig-zag drives resolving to their
    /// true ends.
    fn extreme_block(&self, drive: &str, direction: Bearing) -> Option<BlockId> {
        let mut blocks = self.graph.blocks_in_drive(drive);
        let mut best = blocks.next()?;
        for block in blocks {
            if geometry::is_in_general_direction(&best.position, &block.position, direction) {
                best = block;
            }
        }
        Some(best.id)
    }

    /// The nearest block of `other_drive` joined to `block` by an edge.
    pub fn block_in_adjacent_drive(&self, block: BlockId, other_drive: &str) -> Option<BlockId> {
        let mut best: Option<(BlockId, f64)> = None;
        for (_, neighbour) in self.graph.neighbours(block) {
            if neighbour.description != other_drive {
                continue;
            }
            let distance = self.graph.distance(block, neighbour.id).unwrap_or(f64::INFINITY);
            if best.is_none_or(|(_, kept)| distance < kept) {
                best = Some((neighbour.id, distance));
            }
        }
        best.map(|(id, _)| id)
    }

    /// Names of the other drives joined to `block` by an edge, sorted.
    pub fn adjacent_drives(&self, block: BlockId) -> Vec<String> {
        let Some(own) = self.graph.drive_of(block) else {
            return Vec::new();
        };
        let drives: BTreeSet<&str> = self
            .graph
            .neighbours(block)
            .into_iter()
            .map(|(_, n)| n.description.as_str())
            .filter(|name| *name != own)
            .collect();
        drives.into_iter().map(str::to_owned).collect()
    }

    /// One closest boundary pair per drive physically adjacent to `drive`,
    /// sorted by neighbour drive name.
    pub fn drive_contacts(&self, drive: &str) -> Vec<DriveContact> {
        let mut contacts: BTreeMap<String, DriveContact> = BTreeMap::new();
        for block in self.graph.blocks_in_drive(drive) {
            for other in self.adjacent_drives(block.id) {
                let Some(neighbour_block) = self.block_in_adjacent_drive(block.id, &other) else {
                    continue;
                };
                let distance = self
                    .graph
                    .distance(block.id, neighbour_block)
                    .unwrap_or(f64::INFINITY);
                let closer = contacts.get(&other).is_none_or(|kept| distance < kept.distance);
                if closer {
                    contacts.insert(
                        other.clone(),
                        DriveContact {
                            drive: other,
                            block: block.id,
                            neighbour_block,
                            distance,
                        },
                    );
                }
            }
        }
        contacts.into_values().collect()
    }

    /// Signed position of `block` along `direction`.
    pub fn advance(&self, block: BlockId, direction: Bearing) -> Option<f64> {
        self.graph.advance(block, direction)
    }

    /// Whether `candidate` lies strictly ahead of `reference` along
    /// `direction`.
    pub fn is_ahead(&self, reference: BlockId, candidate: BlockId, direction: Bearing) -> bool {
        match (self.advance(reference, direction), self.advance(candidate, direction)) {
            (Some(r), Some(c)) => c > r + ADVANCE_EPSILON,
            _ => false,
        }
    }

    /// Whichever of two fronts is farther along `direction`.
    ///
    /// A missing front loses to a present one. On a tie the `established`
    /// front is kept, so re-evaluating the same state never moves it.
    pub fn farther(
        &self,
        established: Option<BlockId>,
        candidate: Option<BlockId>,
        direction: Bearing,
    ) -> Option<BlockId> {
        match (established, candidate) {
            (Some(kept), Some(new)) => {
                if self.is_ahead(kept, new, direction) {
                    Some(new)
                } else {
                    Some(kept)
                }
            }
            (kept, new) => kept.or(new),
        }
    }
}
