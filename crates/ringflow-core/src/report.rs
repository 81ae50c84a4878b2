//! Drive by period production report.
//!
//! Entries are bucketed by the calendar period of their start date. The
//! period columns run contiguously from the earliest to the latest
//! bucket, so quiet periods show as zeros rather than disappearing.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};
use ringflow_types::{ReportPeriod, ScheduleEntry};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::warnings::SimulationWarning;

/// A calendar period bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct PeriodKey {
    /// Calendar year.
    pub year: i32,
    /// Calendar month, 1-12.
    pub month: u32,
    /// 0 for a whole month, otherwise 1 (days 1-15) or 2 (days 16-end).
    pub half: u8,
}

impl PeriodKey {
    /// The bucket holding `date`.
    pub fn of(date: DateTime<Utc>, period: ReportPeriod) -> Self {
        let half = match period {
            ReportPeriod::Month => 0,
            ReportPeriod::HalfMonth if date.day() <= 15 => 1,
            ReportPeriod::HalfMonth => 2,
        };
        Self {
            year: date.year(),
            month: date.month(),
            half,
        }
    }

    /// The bucket after this one.
    pub const fn next(self) -> Self {
        match self.half {
            1 => Self { half: 2, ..self },
            half => {
                let (year, month) = if self.month >= 12 {
                    (self.year.saturating_add(1), 1)
                } else {
                    (self.year, self.month.saturating_add(1))
                };
                Self {
                    year,
                    month,
                    half: if half == 0 { 0 } else { 1 },
                }
            }
        }
    }

    /// Column label, e.g. `2025-03` or `2025-03 H2`.
    pub fn label(&self) -> String {
        match self.half {
            0 => format!("{:04}-{:02}", self.year, self.month),
            half => format!("{:04}-{:02} H{half}", self.year, self.month),
        }
    }
}

/// Totals of one drive in one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Cell {
    /// Rings drilled.
    pub rings: u64,
    /// Metres drilled, rounded half away from zero.
    pub metres: i64,
}

/// One drive's row of the report, aligned with
/// [`ProductionReport::periods`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriveRow {
    /// Drive name.
    pub drive: String,
    /// One cell per period column.
    pub cells: Vec<Cell>,
}

/// Rings and metres drilled per drive and period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductionReport {
    /// Period width used.
    pub period: ReportPeriod,
    /// Column labels, in calendar order.
    pub periods: Vec<String>,
    /// One row per drive, sorted by drive name.
    pub rows: Vec<DriveRow>,
    /// Active rings not linked to any block, left out of every tally.
    pub orphaned_rings: usize,
    /// Recoverable conditions raised during the run.
    pub warnings: Vec<SimulationWarning>,
}

/// Aggregate scenario entries into a drive by period matrix.
pub fn build_report(
    entries: &[ScheduleEntry],
    period: ReportPeriod,
    orphaned_rings: usize,
    warnings: Vec<SimulationWarning>,
) -> ProductionReport {
    let mut sums: BTreeMap<String, BTreeMap<PeriodKey, (u64, Decimal)>> = BTreeMap::new();
    for entry in entries {
        let key = PeriodKey::of(entry.start, period);
        let cell = sums
            .entry(entry.description.clone())
            .or_default()
            .entry(key)
            .or_default();
        cell.0 = cell.0.saturating_add(u64::from(entry.rings_since_prev));
        cell.1 = cell.1.saturating_add(entry.metres_since_prev);
    }

    let keys = period_range(sums.values().flat_map(BTreeMap::keys).copied());
    let rows = sums
        .into_iter()
        .map(|(drive, cells)| DriveRow {
            drive,
            cells: keys
                .iter()
                .map(|key| {
                    cells.get(key).map_or_else(Cell::default, |&(rings, metres)| Cell {
                        rings,
                        metres: metres
                            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
                            .to_i64()
                            .unwrap_or_default(),
                    })
                })
                .collect(),
        })
        .collect();

    ProductionReport {
        period,
        periods: keys.iter().map(PeriodKey::label).collect(),
        rows,
        orphaned_rings,
        warnings,
    }
}

/// Every bucket from the earliest to the latest of `keys`, inclusive.
fn period_range(keys: impl Iterator<Item = PeriodKey>) -> Vec<PeriodKey> {
    let mut keys = keys.peekable();
    let Some(first) = keys.peek().copied() else {
        return Vec::new();
    };
    let (lo, hi) = keys.fold((first, first), |(lo, hi), k| (lo.min(k), hi.max(k)));
    let mut range = vec![lo];
    let mut current = lo;
    while current < hi {
        let next = current.next();
        if next <= current {
            break;
        }
        range.push(next);
        current = next;
    }
    range
}
