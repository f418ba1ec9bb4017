use std::collections::BTreeMap;

use tracing::{info, warn};

use super::{match_statuses, route_cable};
use super::types::{
    CableEntry, ContainmentCatalogue, EquipmentCatalogue, RouteResult, RouteStatus, RoutingOptions,
};

/// Progress notification sent after each cable completes.
#[derive(Debug, Clone, Copy)]
pub struct Progress<'a> {
    /// 1-based position of the cable just processed.
    pub index: usize,
    pub total: usize,
    pub cable_reference: &'a str,
    pub from_identifier: &'a str,
    pub to_identifier: &'a str,
    pub status: RouteStatus,
}

/// Result of a batch run.
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// Every cable was processed, rows in manifest order.
    Completed(Vec<RouteResult>),
    /// Cancellation was requested; rows computed so far are discarded.
    Cancelled { processed: usize, total: usize },
}

impl BatchOutcome {
    pub fn rows(&self) -> Option<&[RouteResult]> {
        match self {
            BatchOutcome::Completed(rows) => Some(rows),
            BatchOutcome::Cancelled { .. } => None,
        }
    }
}

/// Route every cable in `manifest`.
///
/// `cancelled` is polled once before each cable; a `true` stops the run and
/// no report is produced. `progress` is called synchronously after each
/// cable. A fault in one cable becomes a `ProcessingError` row and the batch
/// carries on.
pub fn run_batch(
    manifest: &[CableEntry],
    containment: &ContainmentCatalogue,
    equipment: &EquipmentCatalogue,
    options: &RoutingOptions,
    cancelled: impl Fn() -> bool,
    mut progress: impl FnMut(&Progress<'_>),
) -> BatchOutcome {
    let total = manifest.len();
    info!(
        cables = total,
        units = containment.len(),
        equipment = equipment.len(),
        "routing batch started"
    );

    let mut rows = Vec::with_capacity(total);
    for (i, entry) in manifest.iter().enumerate() {
        if cancelled() {
            info!(processed = i, total, "routing batch cancelled");
            return BatchOutcome::Cancelled {
                processed: i,
                total,
            };
        }

        let row = match route_cable(entry, containment, equipment, options) {
            Ok(row) => row,
            Err(err) => {
                warn!(cable = %entry.cable_reference, error = %err, "cable could not be routed");
                RouteResult::processing_error(entry, match_statuses(entry, equipment), &err)
            }
        };

        progress(&Progress {
            index: i + 1,
            total,
            cable_reference: &entry.cable_reference,
            from_identifier: &entry.from_identifier,
            to_identifier: &entry.to_identifier,
            status: row.status,
        });
        rows.push(row);
    }

    info!(cables = total, "routing batch finished");
    BatchOutcome::Completed(rows)
}

/// Row count per status.
pub fn summarize(rows: &[RouteResult]) -> BTreeMap<RouteStatus, usize> {
    let mut counts = BTreeMap::new();
    for row in rows {
        *counts.entry(row.status).or_insert(0) += 1;
    }
    counts
}
