//! Recoverable conditions raised during a scenario.
//!
//! None of these stop a run. Each is logged at `warn` when raised and
//! returned with the scenario outcome.

use core::fmt;

use ringflow_types::BlockId;
use serde::Serialize;
use tracing::warn;

/// Which advancing front a warning refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Front {
    /// The last-charged block.
    Charge,
    /// The last-drilled block.
    Drill,
}

impl fmt::Display for Front {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Charge => f.write_str("charge"),
            Self::Drill => f.write_str("drill"),
        }
    }
}

/// A recoverable condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimulationWarning {
    /// A front could not step ahead because the drive ends.
    EndOfDrive {
        /// Drive name.
        drive: String,
        /// Front that stopped.
        front: Front,
        /// Block the front stays on.
        block: BlockId,
    },
    /// A drive's direction came from the geometric fallback.
    GeometricDirection {
        /// Drive name.
        drive: String,
    },
    /// Blocks with no rings were tallied at the default metres.
    PlaceholderBlocks {
        /// Drive name.
        drive: String,
        /// Number of placeholder blocks in the tally.
        blocks: u32,
    },
    /// A tally walk did not reach its target; nothing was tallied.
    TallyPathBroken {
        /// Drive name.
        drive: String,
        /// Exclusive start, if any.
        from: Option<BlockId>,
        /// Intended inclusive end.
        to: BlockId,
    },
    /// A drill front was held back by a neighbouring drive's charge front.
    InterferenceClamp {
        /// Drive whose drill front was clamped.
        drive: String,
        /// Drive holding the charge.
        neighbour: String,
        /// Where the drill front stopped.
        block: BlockId,
    },
    /// A schedule row's drive name disagrees with its block's drive.
    DescriptionMismatch {
        /// Block identifier of the row.
        identifier: String,
        /// Drive name written in the schedule.
        scheduled: String,
        /// Drive name of the resolved block, which is used.
        resolved: String,
    },
    /// Rings not linked to any block were left out of tallies.
    OrphanedRings {
        /// Number of orphaned rings.
        count: usize,
    },
}

impl fmt::Display for SimulationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EndOfDrive { drive, front, block } => {
                write!(f, "{front} front of {drive} reached the end of the drive at {block}")
            }
            Self::GeometricDirection { drive } => {
                write!(f, "mining direction of {drive} was guessed from geometry")
            }
            Self::PlaceholderBlocks { drive, blocks } => {
                write!(f, "{blocks} block(s) of {drive} had no rings and were tallied at default metres")
            }
            Self::TallyPathBroken { drive, from, to } => match from {
                Some(from) => write!(f, "no path in {drive} from {from} to {to}"),
                None => write!(f, "no path in {drive} from its first block to {to}"),
            },
            Self::InterferenceClamp { drive, neighbour, block } => {
                write!(f, "drill front of {drive} held at {block} by charge in {neighbour}")
            }
            Self::DescriptionMismatch { identifier, scheduled, resolved } => write!(
                f,
                "schedule names drive {scheduled} for {identifier}, block belongs to {resolved}"
            ),
            Self::OrphanedRings { count } => {
                write!(f, "{count} ring(s) are not linked to a block")
            }
        }
    }
}

/// Warnings collected during one scenario, logged as they arrive.
#[derive(Debug, Clone, Default)]
pub struct Warnings {
    items: Vec<SimulationWarning>,
}

impl Warnings {
    /// Create an empty collection.
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Log and keep a warning.
    pub fn push(&mut self, warning: SimulationWarning) {
        warn!(warning = %warning, "Simulation warning");
        self.items.push(warning);
    }

    /// Warnings so far, in the order raised.
    pub fn as_slice(&self) -> &[SimulationWarning] {
        &self.items
    }

    /// Consume the collection.
    pub fn into_vec(self) -> Vec<SimulationWarning> {
        self.items
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn warnings_keep_order() {
        let mut warnings = Warnings::new();
        warnings.push(SimulationWarning::OrphanedRings { count: 2 });
        warnings.push(SimulationWarning::GeometricDirection {
            drive: "A1".to_owned(),
        });
        assert_eq!(warnings.as_slice().len(), 2);
        assert!(matches!(
            warnings.into_vec().first(),
            Some(SimulationWarning::OrphanedRings { count: 2 })
        ));
    }

    #[test]
    fn warnings_serialize_with_a_kind_tag() {
        let warning = SimulationWarning::InterferenceClamp {
            drive: "A1".to_owned(),
            neighbour: "B1".to_owned(),
            block: BlockId::new(),
        };
        let json = serde_json::to_value(&warning).unwrap();
        assert_eq!(json["kind"], "interference_clamp");
        assert_eq!(json["neighbour"], "B1");
        assert!(warning.to_string().contains("held at"));
    }
}
