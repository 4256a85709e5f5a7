// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconciler (§4.5): closes queue entries whose work item is no longer
//! live or whose retry budget is exhausted, once per pass, before the
//! readiness query.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use town_bd::BdClient;
use town_core::{CloseReason, QueueEntry, WorkBeadStatus};

use crate::telemetry;

/// Outcome of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    pub closed: Vec<(town_core::QueueEntryId, CloseReason)>,
}

/// `real.rs` substitutes this sentinel payload when a description blob
/// fails to decode (§4.1); an entry carrying it is "invalid-context".
fn is_invalid_context(entry: &QueueEntry) -> bool {
    entry.payload.work_bead_id.is_empty() || entry.payload.target_rig.is_empty()
}

/// Reconcile `entries` (assumed all `status == open`) against live work-bead
/// state, closing stale/invalid/circuit-broken ones. Fetches work-bead
/// status via a single bulk `list_all_work_beads` per rig directory
/// (§4.5: "never per-entry").
pub async fn reconcile(
    bd: &dyn BdClient,
    town_root: &Path,
    rigs: &[PathBuf],
    entries: &[QueueEntry],
) -> Result<ReconcileReport, town_bd::BdError> {
    let rig_by_name: HashMap<String, &PathBuf> = rigs
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()).map(|n| (n.to_string(), p)))
        .collect();

    let mut statuses: HashMap<String, HashMap<String, WorkBeadStatus>> = HashMap::new();
    let mut report = ReconcileReport::default();

    for entry in entries {
        if !entry.is_open() {
            continue;
        }

        if is_invalid_context(entry) {
            bd.close_queue_entry(town_root, &entry.id, CloseReason::InvalidContext).await?;
            report.closed.push((entry.id.clone(), CloseReason::InvalidContext));
            continue;
        }

        if entry.payload.is_circuit_broken() {
            bd.close_queue_entry(town_root, &entry.id, CloseReason::CircuitBroken).await?;
            telemetry::circuit_broken(&entry.id, entry.payload.dispatch_failures);
            report.closed.push((entry.id.clone(), CloseReason::CircuitBroken));
            continue;
        }

        let rig_name = &entry.payload.target_rig;
        if !statuses.contains_key(rig_name) {
            if let Some(rig_dir) = rig_by_name.get(rig_name) {
                let beads = bd.list_all_work_beads(rig_dir).await?;
                statuses.insert(
                    rig_name.clone(),
                    beads.into_iter().map(|b| (b.id, b.status)).collect(),
                );
            } else {
                statuses.insert(rig_name.clone(), HashMap::new());
            }
        }

        let bead_status = statuses.get(rig_name).and_then(|m| m.get(&entry.payload.work_bead_id));
        match bead_status {
            Some(status) if status.is_stale_for_dispatch() => {
                bd.close_queue_entry(town_root, &entry.id, CloseReason::StaleWorkBead).await?;
                report.closed.push((entry.id.clone(), CloseReason::StaleWorkBead));
            }
            // Not found or still open/in_progress: leave untouched (§4.5 rule 4).
            _ => {}
        }
    }

    Ok(report)
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
