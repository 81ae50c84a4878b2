//! Enumeration types for the ringflow simulator.
//!
//! Compass bearings, ring lifecycle states, sequencing roles, and report
//! granularities. Geometry over bearings (classification, opposites,
//! tolerance sets) lives in `ringflow-graph`; this module only defines the
//! values and their wire names.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Bearings
// ---------------------------------------------------------------------------

/// One of the eight compass octants used to classify relative position.
///
/// Bearings follow the planar convention of the mine grid: `x` grows to the
/// east, `y` grows to the north. The wire name is the short compass code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Bearing {
    /// North (`y` increasing).
    #[serde(rename = "N")]
    North,
    /// North-east.
    #[serde(rename = "NE")]
    NorthEast,
    /// East (`x` increasing).
    #[serde(rename = "E")]
    East,
    /// South-east.
    #[serde(rename = "SE")]
    SouthEast,
    /// South (`y` decreasing).
    #[serde(rename = "S")]
    South,
    /// South-west.
    #[serde(rename = "SW")]
    SouthWest,
    /// West (`x` decreasing).
    #[serde(rename = "W")]
    West,
    /// North-west.
    #[serde(rename = "NW")]
    NorthWest,
}

impl Bearing {
    /// All eight bearings, clockwise from north.
    pub const ALL: [Self; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Short compass code (`"N"`, `"NE"`, ...).
    pub const fn code(self) -> &'static str {
        match self {
            Self::North => "N",
            Self::NorthEast => "NE",
            Self::East => "E",
            Self::SouthEast => "SE",
            Self::South => "S",
            Self::SouthWest => "SW",
            Self::West => "W",
            Self::NorthWest => "NW",
        }
    }

    /// Position of this bearing in [`Bearing::ALL`].
    pub const fn ordinal(self) -> usize {
        match self {
            Self::North => 0,
            Self::NorthEast => 1,
            Self::East => 2,
            Self::SouthEast => 3,
            Self::South => 4,
            Self::SouthWest => 5,
            Self::West => 6,
            Self::NorthWest => 7,
        }
    }
}

impl core::fmt::Display for Bearing {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.code())
    }
}

impl core::str::FromStr for Bearing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|b| b.code().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown bearing: {s}"))
    }
}

// ---------------------------------------------------------------------------
// Production rings
// ---------------------------------------------------------------------------

/// Primary lifecycle state of a production ring.
///
/// The simulator only reads these; the state machine that moves a ring
/// between them belongs to the record-keeping layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RingStatus {
    /// Designed but not yet drilled.
    Designed,
    /// Holes drilled, not yet charged.
    Drilled,
    /// Holes charged with explosive.
    Charged,
    /// Fired, awaiting bogging.
    Fired,
    /// Broken ore being bogged.
    Bogging,
    /// Fully bogged.
    Complete,
    /// Abandoned; excluded from fronts.
    Abandoned,
}

impl RingStatus {
    /// Every status, in lifecycle order with `Abandoned` last.
    pub const ALL: [Self; 7] = [
        Self::Designed,
        Self::Drilled,
        Self::Charged,
        Self::Fired,
        Self::Bogging,
        Self::Complete,
        Self::Abandoned,
    ];

    /// Whether a ring in this state has already passed through `stage`.
    /// A charged ring has been drilled; an abandoned ring has reached
    /// nothing.
    pub fn has_reached(self, stage: Self) -> bool {
        self != Self::Abandoned && stage != Self::Abandoned && self >= stage
    }
}

// ---------------------------------------------------------------------------
// Sequencing and direction provenance
// ---------------------------------------------------------------------------

/// Role of the linked block in a [`SequenceLink`](crate::SequenceLink).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkRole {
    /// The linked block is mined before the block.
    Predecessor,
    /// The linked block is mined after the block.
    Successor,
}

/// How a drive's mining direction was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DirectionSource {
    /// From an explicit sequencing hint in upstream planning data.
    SequenceLink,
    /// From the farthest-point geometric fallback.
    Geometric,
}

// ---------------------------------------------------------------------------
// Reporting
// ---------------------------------------------------------------------------

/// Width of a reporting period column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    /// One column per calendar month.
    #[default]
    Month,
    /// Two columns per calendar month: days 1-15 and 16-end.
    HalfMonth,
}

impl core::str::FromStr for ReportPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "month" => Ok(Self::Month),
            "half_month" | "half-month" => Ok(Self::HalfMonth),
            other => Err(format!("unknown report period: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearing_codes_roundtrip_through_from_str() {
        for bearing in Bearing::ALL {
            assert_eq!(bearing.code().parse::<Bearing>(), Ok(bearing));
        }
        assert!("north".parse::<Bearing>().is_err());
    }

    #[test]
    fn bearing_ordinals_match_all_table() {
        for (idx, bearing) in Bearing::ALL.iter().enumerate() {
            assert_eq!(bearing.ordinal(), idx);
        }
    }

    #[test]
    fn bearing_serializes_as_compass_code() {
        let json = serde_json::to_string(&Bearing::SouthWest).unwrap_or_default();
        assert_eq!(json, "\"SW\"");
    }

    #[test]
    fn later_ring_states_have_reached_earlier_ones() {
        assert!(RingStatus::Charged.has_reached(RingStatus::Drilled));
        assert!(RingStatus::Complete.has_reached(RingStatus::Charged));
        assert!(RingStatus::Bogging.has_reached(RingStatus::Bogging));
        assert!(!RingStatus::Drilled.has_reached(RingStatus::Charged));
        assert!(!RingStatus::Designed.has_reached(RingStatus::Drilled));
        assert!(!RingStatus::Abandoned.has_reached(RingStatus::Drilled));
        assert!(!RingStatus::Complete.has_reached(RingStatus::Abandoned));
    }

    #[test]
    fn report_period_parses_both_spellings() {
        assert_eq!("half-month".parse::<ReportPeriod>(), Ok(ReportPeriod::HalfMonth));
        assert_eq!("Month".parse::<ReportPeriod>(), Ok(ReportPeriod::Month));
        assert!("quarter".parse::<ReportPeriod>().is_err());
    }
}
