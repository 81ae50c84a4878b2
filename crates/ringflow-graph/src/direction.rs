//! Mining direction resolution.
//!
//! A drive's direction comes from a sequencing hint when one links two of
//! its own blocks. Otherwise, if the fallback is allowed, it is guessed
//! geometrically: the block farthest from the first ingested block is
//! taken as the last block, the block farthest from that as the first, and
//! the direction is the bearing from first to last.
//!
//! Drives with fewer than two blocks have no direction. That is reported
//! as an error so the planning data can be fixed; it is never defaulted.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use ringflow_store::DirectionRepository;
use ringflow_types::{Bearing, Block, DirectionSource, LinkRole, MiningDirectionRecord};
use tracing::{debug, info};

use crate::error::GraphError;
use crate::navigator::Navigator;

/// Resolve the direction record of one drive from the graph.
///
/// # Errors
///
/// Returns [`GraphError::NoMiningDirection`] if the drive has fewer than
/// two active blocks, if no hint applies and the geometric fallback is
/// disabled, or if every block of the drive coincides in plan.
pub fn resolve_drive(
    navigator: &Navigator<'_>,
    drive: &str,
    allow_geometric: bool,
) -> Result<MiningDirectionRecord, GraphError> {
    let graph = navigator.graph();
    let blocks: Vec<&Block> = graph.blocks_in_drive(drive).collect();
    match blocks.len() {
        0 => return Err(no_direction(drive, "drive has no active blocks")),
        1 => return Err(no_direction(drive, "drive has a single block")),
        _ => {}
    }

    let (direction, source) = if let Some(direction) = direction_from_links(navigator, &blocks) {
        (direction, DirectionSource::SequenceLink)
    } else if allow_geometric {
        let direction = direction_from_geometry(navigator, &blocks)
            .ok_or_else(|| no_direction(drive, "all blocks coincide in plan"))?;
        (direction, DirectionSource::Geometric)
    } else {
        return Err(no_direction(
            drive,
            "no sequence link within the drive and geometric fallback is disabled",
        ));
    };

    let first_block = navigator
        .first_block_of_drive(drive, direction)
        .ok_or_else(|| no_direction(drive, "no first block"))?;
    let last_block = navigator
        .last_block_of_drive(drive, direction)
        .ok_or_else(|| no_direction(drive, "no last block"))?;

    debug!(drive, direction = %direction, source = ?source, "Resolved mining direction");
    Ok(MiningDirectionRecord {
        description: drive.to_owned(),
        direction,
        first_block,
        last_block,
        source,
    })
}

fn no_direction(drive: &str, reason: &str) -> GraphError {
    GraphError::NoMiningDirection {
        drive: drive.to_owned(),
        reason: reason.to_owned(),
    }
}

/// First hint, in ingestion order, linking two distinct positions of the
/// same drive.
fn direction_from_links(navigator: &Navigator<'_>, blocks: &[&Block]) -> Option<Bearing> {
    let graph = navigator.graph();
    blocks.iter().find_map(|block| {
        graph
            .links(block.id)
            .into_iter()
            .filter(|(linked, _)| linked.description == block.description)
            .find_map(|(linked, role)| match role {
                LinkRole::Successor => graph.bearing_between(block.id, linked.id),
                LinkRole::Predecessor => graph.bearing_between(linked.id, block.id),
            })
    })
}

/// Two-pass farthest-point estimate of the drive's long axis.
fn direction_from_geometry(navigator: &Navigator<'_>, blocks: &[&Block]) -> Option<Bearing> {
    let graph = navigator.graph();
    let reference = blocks.first()?;
    let last = farthest_from(navigator, reference, blocks)?;
    let first = farthest_from(navigator, last, blocks)?;
    graph.bearing_between(first.id, last.id)
}

/// The block farthest from `origin`; ties keep the earliest. `None` when
/// every block sits on `origin`.
fn farthest_from<'a>(
    navigator: &Navigator<'_>,
    origin: &Block,
    blocks: &[&'a Block],
) -> Option<&'a Block> {
    let graph = navigator.graph();
    let mut best: Option<(&Block, f64)> = None;
    for &block in blocks {
        let distance = graph.distance(origin.id, block.id).unwrap_or_default();
        let kept = best.map_or(0.0, |(_, d)| d);
        if distance > kept {
            best = Some((block, distance));
        }
    }
    best.map(|(block, _)| block)
}

/// Per-drive cache of resolved directions.
///
/// Seeded from stored records; anything resolved afterwards is remembered
/// as new so the caller can persist it.
#[derive(Debug, Clone, Default)]
pub struct DirectionCache {
    records: BTreeMap<String, MiningDirectionRecord>,
    fresh: Vec<String>,
    allow_geometric: bool,
}

impl DirectionCache {
    /// Create an empty cache.
    pub const fn new(allow_geometric: bool) -> Self {
        Self {
            records: BTreeMap::new(),
            fresh: Vec::new(),
            allow_geometric,
        }
    }

    /// Create a cache pre-filled with stored records.
    pub fn with_records(records: Vec<MiningDirectionRecord>, allow_geometric: bool) -> Self {
        let mut cache = Self::new(allow_geometric);
        for record in records {
            cache.records.insert(record.description.clone(), record);
        }
        cache
    }

    /// The record of `drive`, resolving it on first use.
    ///
    /// # Errors
    ///
    /// Returns the error of [`resolve_drive`] on a cache miss.
    pub fn resolve(
        &mut self,
        navigator: &Navigator<'_>,
        drive: &str,
    ) -> Result<&MiningDirectionRecord, GraphError> {
        match self.records.entry(drive.to_owned()) {
            Entry::Occupied(entry) => Ok(entry.into_mut()),
            Entry::Vacant(entry) => {
                let record = resolve_drive(navigator, drive, self.allow_geometric)?;
                self.fresh.push(drive.to_owned());
                Ok(entry.insert(record))
            }
        }
    }

    /// The cached record of `drive`, without resolving.
    pub fn get(&self, drive: &str) -> Option<&MiningDirectionRecord> {
        self.records.get(drive)
    }

    /// Records resolved since the cache was created or last drained.
    pub fn take_fresh(&mut self) -> Vec<MiningDirectionRecord> {
        std::mem::take(&mut self.fresh)
            .into_iter()
            .filter_map(|drive| self.records.get(&drive).cloned())
            .collect()
    }
}

/// Outcome of [`refresh_directions`].
#[derive(Debug, Default)]
pub struct DirectionRefresh {
    /// Records resolved and saved.
    pub resolved: Vec<MiningDirectionRecord>,
    /// Drives that could not be resolved, with the reason.
    pub failed: Vec<GraphError>,
}

/// Recompute the direction of every drive in the graph and replace the
/// stored records.
///
/// Drives that cannot be resolved lose their stored record and are
/// reported in [`DirectionRefresh::failed`].
///
/// # Errors
///
/// Returns [`GraphError::Store`] if clearing or saving records fails.
pub fn refresh_directions<S>(
    store: &S,
    navigator: &Navigator<'_>,
    allow_geometric: bool,
) -> Result<DirectionRefresh, GraphError>
where
    S: DirectionRepository + ?Sized,
{
    let drives: Vec<String> = navigator.graph().drive_names().map(str::to_owned).collect();
    let mut refresh = DirectionRefresh::default();
    for drive in &drives {
        match resolve_drive(navigator, drive, allow_geometric) {
            Ok(record) => refresh.resolved.push(record),
            Err(err) => refresh.failed.push(err),
        }
    }
    store.clear_directions(&drives)?;
    store.save_directions(refresh.resolved.clone())?;
    info!(
        resolved = refresh.resolved.len(),
        failed = refresh.failed.len(),
        "Refreshed mining directions"
    );
    Ok(refresh)
}
