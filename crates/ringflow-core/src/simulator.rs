//! Schedule simulator.
//!
//! Rows are processed in one chronological order across all drives. For
//! each row, in order:
//!
//! 1. Seed the drive's state from live ring status if this is its first
//!    appearance, resolving its mining direction.
//! 2. Step the charge front `min_precharge_distance` ahead of the bogging
//!    block, never behind the previous charge front.
//! 3. Step the proposed drill front `min_drill_lead_distance` ahead of the
//!    charge front, never behind the previous drill front or the charge
//!    front itself.
//! 4. Hold the drill front short of neighbouring drives' charge fronts
//!    (see [`crate::interference`]).
//! 5. Tally rings and metres since the previous fronts and emit the entry.
//!
//! Because no step ever moves a front backward, each drive's drill front
//! is non-decreasing along its mining direction across its entries.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use chrono::{DateTime, Utc};
use ringflow_graph::{DirectionCache, Navigator};
use ringflow_store::RingRepository;
use ringflow_types::{
    Bearing, BlockId, DirectionSource, MiningDirectionRecord, ScenarioId, ScheduleEntry,
    ScheduleEntryId,
};
use rust_decimal::Decimal;
use tracing::debug;

use crate::config::SimulationConfig;
use crate::error::SimulationError;
use crate::rings::{LiveFronts, RingIndex};
use crate::schedule::ResolvedRow;
use crate::tally::{Tally, tally_span};
use crate::warnings::{Front, SimulationWarning, Warnings};

/// Charge and drill fronts of a drive as of a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrontSnapshot {
    /// Date the fronts were reached.
    pub date: DateTime<Utc>,
    /// Last-charged block.
    pub charge: Option<BlockId>,
    /// Last-drilled block.
    pub drill: Option<BlockId>,
}

/// Simulated state of one drive.
#[derive(Debug, Clone)]
pub(crate) struct DriveState {
    pub(crate) direction: Bearing,
    pub(crate) level: i32,
    pub(crate) first_block: BlockId,
    pub(crate) bogging: Option<BlockId>,
    pub(crate) charge: Option<BlockId>,
    pub(crate) drill: Option<BlockId>,
    /// Fronts after each entry of the drive, in processing order.
    pub(crate) history: Vec<FrontSnapshot>,
}

/// Everything a finished simulation produced.
#[derive(Debug)]
pub struct SimulationRun {
    /// Entries in processing order, synthesized ones included.
    pub entries: Vec<ScheduleEntry>,
    /// Directions resolved during the run that were not cached before.
    pub fresh_directions: Vec<MiningDirectionRecord>,
    /// Warnings raised so far.
    pub warnings: Warnings,
}

/// Forward simulation of one scenario's schedule.
pub struct Simulator<'a, S: ?Sized> {
    pub(crate) store: &'a S,
    pub(crate) navigator: Navigator<'a>,
    rings: &'a RingIndex,
    directions: DirectionCache,
    pub(crate) settings: &'a SimulationConfig,
    pub(crate) scenario: ScenarioId,
    pub(crate) drives: BTreeMap<String, DriveState>,
    pub(crate) entries: Vec<ScheduleEntry>,
    pub(crate) warnings: Warnings,
}

impl<'a, S> Simulator<'a, S>
where
    S: RingRepository + ?Sized,
{
    /// Create a simulator for `scenario`.
    ///
    /// `warnings` carries anything raised while the schedule was read.
    pub const fn new(
        store: &'a S,
        navigator: Navigator<'a>,
        rings: &'a RingIndex,
        directions: DirectionCache,
        settings: &'a SimulationConfig,
        scenario: ScenarioId,
        warnings: Warnings,
    ) -> Self {
        Self {
            store,
            navigator,
            rings,
            directions,
            settings,
            scenario,
            drives: BTreeMap::new(),
            entries: Vec::new(),
            warnings,
        }
    }

    /// Advance every row in order and return the result.
    ///
    /// # Errors
    ///
    /// Returns the first error of [`Simulator::advance`].
    pub fn run(mut self, rows: &[ResolvedRow]) -> Result<SimulationRun, SimulationError> {
        for row in rows {
            self.advance(row)?;
        }
        Ok(self.finish())
    }

    /// Stop and hand back what was produced.
    pub fn finish(mut self) -> SimulationRun {
        SimulationRun {
            fresh_directions: self.directions.take_fresh(),
            entries: self.entries,
            warnings: self.warnings,
        }
    }

    /// Simulate one schedule row.
    ///
    /// # Errors
    ///
    /// Returns [`SimulationError::Graph`] if the mining direction of the
    /// row's drive, or of a neighbour needing a synthesized entry, cannot
    /// be resolved, or [`SimulationError::Store`] if live rings cannot be
    /// read.
    pub fn advance(&mut self, row: &ResolvedRow) -> Result<(), SimulationError> {
        let drive = row.drive.as_str();
        let (direction, first_block, prev_charge, prev_drill) = {
            let state = self.ensure_drive(drive)?;
            (state.direction, state.first_block, state.charge, state.drill)
        };
        let nav = self.navigator;
        let precharge = self.settings.min_precharge_distance;
        let lead = self.settings.min_drill_lead_distance;

        // Charge front
        let stepped = nav.step_distance(row.block, direction, precharge);
        if stepped.is_none() && precharge > 0.0 {
            self.warnings.push(SimulationWarning::EndOfDrive {
                drive: drive.to_owned(),
                front: Front::Charge,
                block: row.block,
            });
        }
        let charge = nav
            .farther(prev_charge, Some(stepped.unwrap_or(row.block)), direction)
            .unwrap_or(row.block);

        // Drill front
        let led = nav.step_distance(charge, direction, lead);
        if led.is_none() && lead > 0.0 {
            self.warnings.push(SimulationWarning::EndOfDrive {
                drive: drive.to_owned(),
                front: Front::Drill,
                block: charge,
            });
        }
        let floor = nav
            .farther(prev_drill, Some(charge), direction)
            .unwrap_or(charge);
        let proposed = nav
            .farther(Some(floor), led, direction)
            .unwrap_or(floor);

        let drill = self.hold_short_of_neighbours(drive, row, direction, floor, proposed)?;

        // Tallies
        let drilled = self.tally_between(drive, prev_drill, drill, direction, first_block);
        if drilled.placeholder_blocks > 0 {
            self.warnings.push(SimulationWarning::PlaceholderBlocks {
                drive: drive.to_owned(),
                blocks: drilled.placeholder_blocks,
            });
        }
        let charged = self.tally_between(drive, prev_charge, charge, direction, first_block);

        let level = match self.drives.get_mut(drive) {
            Some(state) => {
                state.bogging = Some(row.block);
                state.charge = Some(charge);
                state.drill = Some(drill);
                state.history.push(FrontSnapshot {
                    date: row.start,
                    charge: Some(charge),
                    drill: Some(drill),
                });
                state.level
            }
            None => row.level,
        };

        debug!(
            drive,
            identifier = %row.blastsolids_id,
            rings = drilled.rings,
            metres = %drilled.metres,
            "Advanced drive fronts"
        );
        self.push_entry(ScheduleEntry {
            id: ScheduleEntryId::new(),
            scenario: self.scenario,
            sequence: 0,
            description: drive.to_owned(),
            blastsolids_id: row.blastsolids_id.clone(),
            level,
            start: row.start,
            finish: row.finish,
            mining_direction: Some(direction),
            bogging_block: Some(row.block),
            last_charge_block: Some(charge),
            last_drill_block: Some(drill),
            rings_since_prev: drilled.rings,
            metres_since_prev: drilled.metres,
            charged_rings_since_prev: charged.rings,
            synthesized: false,
        });
        Ok(())
    }

    /// State of `drive`, seeding it from live rings on first use.
    pub(crate) fn ensure_drive(&mut self, drive: &str) -> Result<&mut DriveState, SimulationError> {
        let slot = match self.drives.entry(drive.to_owned()) {
            Entry::Occupied(slot) => return Ok(slot.into_mut()),
            Entry::Vacant(slot) => slot,
        };
        let record = self.directions.resolve(&self.navigator, drive)?.clone();
        if record.source == DirectionSource::Geometric {
            self.warnings.push(SimulationWarning::GeometricDirection {
                drive: drive.to_owned(),
            });
        }
        let live = LiveFronts::read(self.store, &self.navigator, drive, record.direction)?;
        let level = self
            .navigator
            .graph()
            .block(record.first_block)
            .map_or(0, |b| b.level);
        debug!(
            drive,
            direction = %record.direction,
            charge = ?live.charge,
            drill = ?live.drill,
            "Seeded drive from live rings"
        );
        Ok(slot.insert(DriveState {
            direction: record.direction,
            level,
            first_block: record.first_block,
            bogging: live.bogging,
            charge: live.charge,
            drill: live.drill,
            history: Vec::new(),
        }))
    }

    pub(crate) fn push_entry(&mut self, mut entry: ScheduleEntry) {
        entry.sequence = u32::try_from(self.entries.len()).unwrap_or(u32::MAX);
        self.entries.push(entry);
    }

    fn tally_between(
        &mut self,
        drive: &str,
        from: Option<BlockId>,
        to: BlockId,
        direction: Bearing,
        seed: BlockId,
    ) -> Tally {
        let default_metres: Decimal = self.settings.default_block_metres;
        if let Some(tally) =
            tally_span(&self.navigator, self.rings, from, to, direction, seed, default_metres)
        {
            return tally;
        }
        self.warnings.push(SimulationWarning::TallyPathBroken {
            drive: drive.to_owned(),
            from,
            to,
        });
        Tally::default()
    }
}
