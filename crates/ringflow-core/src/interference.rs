//! Interference between physically adjacent drives.
//!
//! Drilling may not continue to within `min_drill_lead_distance` of a
//! neighbouring drive's charge front. When a drive advances, each
//! neighbouring drive (one closest boundary contact per drive) is
//! consulted for its fronts as of the advancing row's start date:
//!
//! - A neighbour with simulated state contributes its charge front.
//! - A neighbour with none is seeded from live ring status and given a
//!   synthesized entry dated at the advancing row, once per scenario, so
//!   later rows see consistent state.
//!
//! The drill front is then walked from its floor toward the proposed front
//! and stops on the last block still clear of every neighbour's charge.
//! Neighbours are only read, never advanced, so no interaction recurses.

use chrono::{DateTime, Utc};
use ringflow_store::RingRepository;
use ringflow_types::{Bearing, BlockId, ScheduleEntry, ScheduleEntryId};
use rust_decimal::Decimal;
use tracing::info;

use crate::error::SimulationError;
use crate::schedule::ResolvedRow;
use crate::simulator::{FrontSnapshot, Simulator};
use crate::warnings::SimulationWarning;

impl<S> Simulator<'_, S>
where
    S: RingRepository + ?Sized,
{
    /// Clamp a proposed drill front against every neighbouring drive.
    ///
    /// The result lies between `floor` and `proposed` along `direction`.
    pub(crate) fn hold_short_of_neighbours(
        &mut self,
        drive: &str,
        row: &ResolvedRow,
        direction: Bearing,
        floor: BlockId,
        proposed: BlockId,
    ) -> Result<BlockId, SimulationError> {
        let mut front = proposed;
        for contact in self.navigator.drive_contacts(drive) {
            let neighbour_charge = match self.fronts_at(&contact.drive, row.start) {
                Some(snapshot) => snapshot.charge,
                None => self.synthesize(&contact.drive, row)?,
            };
            let Some(charge) = neighbour_charge else {
                continue;
            };
            let held = self.hold_short(floor, front, direction, charge);
            if held != front {
                self.warnings.push(SimulationWarning::InterferenceClamp {
                    drive: drive.to_owned(),
                    neighbour: contact.drive.clone(),
                    block: held,
                });
                front = held;
            }
        }
        Ok(front)
    }

    /// Fronts of `drive` as of `date`, or `None` if the drive has no
    /// simulated state yet.
    pub(crate) fn fronts_at(&self, drive: &str, date: DateTime<Utc>) -> Option<FrontSnapshot> {
        let state = self.drives.get(drive)?;
        let seeded = FrontSnapshot {
            date,
            charge: state.charge,
            drill: state.drill,
        };
        Some(
            state
                .history
                .iter()
                .rev()
                .find(|snapshot| snapshot.date <= date)
                .copied()
                .unwrap_or(seeded),
        )
    }

    /// The farthest block from `floor` toward `proposed` that keeps at
    /// least the lead distance to `charge`. `floor` itself is never held
    /// back.
    fn hold_short(
        &self,
        floor: BlockId,
        proposed: BlockId,
        direction: Bearing,
        charge: BlockId,
    ) -> BlockId {
        let lead = self.settings.min_drill_lead_distance;
        let graph = self.navigator.graph();
        let clear = |block: BlockId| graph.distance(block, charge).is_none_or(|d| d >= lead);

        let walk = self.navigator.walk(floor, proposed, direction);
        if !walk.reached {
            return if clear(proposed) { proposed } else { floor };
        }
        let mut front = floor;
        for block in walk.blocks {
            if !clear(block) {
                break;
            }
            front = block;
        }
        front
    }

    /// Seed a neighbouring drive and record a synthesized entry for it.
    /// Returns its charge front.
    fn synthesize(
        &mut self,
        drive: &str,
        row: &ResolvedRow,
    ) -> Result<Option<BlockId>, SimulationError> {
        let scenario = self.scenario;
        let graph = self.navigator.graph();
        let state = self.ensure_drive(drive)?;
        let snapshot = FrontSnapshot {
            date: row.start,
            charge: state.charge,
            drill: state.drill,
        };
        state.history.push(snapshot);

        let anchor = state
            .bogging
            .or(state.charge)
            .or(state.drill)
            .unwrap_or(state.first_block);
        let anchor_block = graph
            .block(anchor)
            .ok_or(SimulationError::UnknownBlock(anchor))?;
        let entry = ScheduleEntry {
            id: ScheduleEntryId::new(),
            scenario,
            sequence: 0,
            description: drive.to_owned(),
            blastsolids_id: anchor_block.blastsolids_id.clone(),
            level: state.level,
            start: row.start,
            finish: row.finish,
            mining_direction: Some(state.direction),
            bogging_block: state.bogging,
            last_charge_block: state.charge,
            last_drill_block: state.drill,
            rings_since_prev: 0,
            metres_since_prev: Decimal::ZERO,
            charged_rings_since_prev: 0,
            synthesized: true,
        };
        info!(
            drive,
            triggered_by = %row.drive,
            charge = ?snapshot.charge,
            "Synthesized neighbour entry"
        );
        self.push_entry(entry);
        Ok(snapshot.charge)
    }
}
