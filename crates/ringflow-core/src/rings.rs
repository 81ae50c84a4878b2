//! Read-side view of production rings: per-block totals and live fronts.

use std::collections::HashMap;

use ringflow_graph::Navigator;
use ringflow_store::{RingRepository, StoreError};
use ringflow_types::{Bearing, BlockId, ProductionRing, RingStatus};
use rust_decimal::Decimal;

/// Totals of the active rings mined against one block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BlockRings {
    /// Number of active rings.
    pub count: u32,
    /// Sum of their drilled metres; unknown metres count as zero.
    pub metres: Decimal,
}

/// Active rings grouped by block.
#[derive(Debug, Clone, Default)]
pub struct RingIndex {
    per_block: HashMap<BlockId, BlockRings>,
    orphaned: usize,
}

impl RingIndex {
    /// Index active rings. Rings with no block are counted as orphans.
    pub fn from_rings(rings: &[ProductionRing]) -> Self {
        let mut index = Self::default();
        for ring in rings.iter().filter(|r| r.is_active) {
            let Some(block) = ring.block else {
                index.orphaned = index.orphaned.saturating_add(1);
                continue;
            };
            let entry = index.per_block.entry(block).or_default();
            entry.count = entry.count.saturating_add(1);
            entry.metres = entry
                .metres
                .saturating_add(ring.drilled_metres.unwrap_or_default());
        }
        index
    }

    /// Index every ring in a store.
    ///
    /// # Errors
    ///
    /// Returns the store's error if the read fails.
    pub fn load<S>(store: &S) -> Result<Self, StoreError>
    where
        S: RingRepository + ?Sized,
    {
        Ok(Self::from_rings(&store.rings()?))
    }

    /// Totals for `block`, if it has any active ring.
    pub fn block(&self, block: BlockId) -> Option<&BlockRings> {
        self.per_block.get(&block)
    }

    /// Active rings not linked to any block.
    pub const fn orphaned(&self) -> usize {
        self.orphaned
    }
}

/// Fronts of a drive as recorded by live ring status.
///
/// A ring counts toward every front it has already passed: a charged ring
/// is also drilled, a completed ring is also charged and bogged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiveFronts {
    /// Farthest block being or already bogged.
    pub bogging: Option<BlockId>,
    /// Farthest block charged or beyond.
    pub charge: Option<BlockId>,
    /// Farthest block drilled or beyond.
    pub drill: Option<BlockId>,
}

impl LiveFronts {
    /// Read the live fronts of `drive`, measuring "farthest" along
    /// `direction`. Rings whose block is not in the graph are ignored.
    ///
    /// # Errors
    ///
    /// Returns the store's error if a read fails.
    pub fn read<S>(
        store: &S,
        navigator: &Navigator<'_>,
        drive: &str,
        direction: Bearing,
    ) -> Result<Self, StoreError>
    where
        S: RingRepository + ?Sized,
    {
        let mut progressed: Vec<(BlockId, RingStatus)> = Vec::new();
        for status in RingStatus::ALL {
            if !status.has_reached(RingStatus::Drilled) {
                continue;
            }
            progressed.extend(
                store
                    .rings_in_drive(drive, status)?
                    .iter()
                    .filter_map(|r| r.block.map(|b| (b, r.status)))
                    .filter(|&(b, _)| navigator.graph().contains(b)),
            );
        }

        let front = |stage: RingStatus| {
            progressed
                .iter()
                .filter(|(_, status)| status.has_reached(stage))
                .fold(None, |kept, &(b, _)| navigator.farther(kept, Some(b), direction))
        };
        Ok(Self {
            bogging: front(RingStatus::Bogging),
            charge: front(RingStatus::Charged),
            drill: front(RingStatus::Drilled),
        })
    }
}
