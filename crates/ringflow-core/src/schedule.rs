//! Schedule intake: collapse duplicate rows, resolve blocks, and order.

use chrono::{DateTime, Utc};
use ringflow_graph::BlockGraph;
use ringflow_types::{BlockId, ScheduleRow};
use tracing::debug;

use crate::error::ScenarioError;
use crate::warnings::{SimulationWarning, Warnings};

/// A schedule row tied to the block it names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRow {
    /// Position of the row in the collapsed upload.
    pub upload_index: usize,
    /// External block identifier.
    pub blastsolids_id: String,
    /// The resolved bogging block.
    pub block: BlockId,
    /// Drive of the resolved block.
    pub drive: String,
    /// Level of the resolved block.
    pub level: i32,
    /// Scheduled start.
    pub start: DateTime<Utc>,
    /// Scheduled finish.
    pub finish: DateTime<Utc>,
}

/// Collapse runs of consecutive rows naming the same block into one row
/// spanning the run: the first row's start and the last row's finish.
pub fn collapse_duplicates(rows: Vec<ScheduleRow>) -> Vec<ScheduleRow> {
    let mut collapsed: Vec<ScheduleRow> = Vec::with_capacity(rows.len());
    for row in rows {
        match collapsed.last_mut() {
            Some(prev) if prev.blastsolids_id == row.blastsolids_id => {
                prev.finish = prev.finish.max(row.finish);
            }
            _ => collapsed.push(row),
        }
    }
    collapsed
}

/// Resolve every row to an active block and return them in processing
/// order: by start date, then upload order.
///
/// A row's drive always comes from its block. A disagreeing drive name in
/// the row raises [`SimulationWarning::DescriptionMismatch`].
///
/// # Errors
///
/// Returns [`ScenarioError::UnresolvedBlock`] for the first row whose
/// identifier matches no active block.
pub fn resolve_rows(
    graph: &BlockGraph,
    rows: Vec<ScheduleRow>,
    warnings: &mut Warnings,
) -> Result<Vec<ResolvedRow>, ScenarioError> {
    let mut resolved = Vec::with_capacity(rows.len());
    for (upload_index, row) in rows.into_iter().enumerate() {
        let block = graph
            .resolve_external(&row.blastsolids_id, Some(row.level))
            .ok_or_else(|| ScenarioError::UnresolvedBlock {
                identifier: row.blastsolids_id.clone(),
            })?;

        if let Some(scheduled) = row.description.as_deref() {
            let scheduled = scheduled.trim();
            if !scheduled.is_empty() && scheduled != block.description {
                warnings.push(SimulationWarning::DescriptionMismatch {
                    identifier: row.blastsolids_id.clone(),
                    scheduled: scheduled.to_owned(),
                    resolved: block.description.clone(),
                });
            }
        }

        resolved.push(ResolvedRow {
            upload_index,
            blastsolids_id: row.blastsolids_id,
            block: block.id,
            drive: block.description.clone(),
            level: block.level,
            start: row.start,
            finish: row.finish,
        });
    }

    resolved.sort_by_key(|r| (r.start, r.upload_index));
    debug!(rows = resolved.len(), "Resolved schedule rows");
    Ok(resolved)
}
