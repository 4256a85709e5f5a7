// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Orphan cleanup (§4.9): a destructive admin operation, run on demand
//! rather than every pass, that permanently deletes closed queue entries
//! whose `target_rig` no longer has a discovered directory under the town
//! root (the rig was torn down or renamed after its entries closed).
//!
//! Unlike the reconciler (§4.5: routine, non-destructive `close` calls),
//! this issues hard deletes, so §4.9's rule applies directly: on the first
//! read-only write it must abort the sweep rather than push through partial
//! progress, and hand off to `sql_health::check_and_recover` so the server
//! gets a chance to come back before anything else touches it.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use town_adapters::SqlServerAdapter;
use town_bd::{BdClient, BdError};
use town_core::QueueEntryId;

use crate::error::DispatchError;
use crate::telemetry;

/// Outcome of one orphan-cleanup run.
#[derive(Debug, Default)]
pub struct OrphanCleanupReport {
    pub deleted: Vec<QueueEntryId>,
    /// True if the sweep stopped early on a read-only write rather than
    /// running out of orphan candidates.
    pub aborted_on_read_only: bool,
}

/// Delete closed queue entries whose rig is gone. `live_rigs` should come
/// from `workspace::discover_rigs` so "gone" means "not currently in the
/// workspace", matching how the reconciler and planner see the town.
///
/// Aborts on the first read-only write encountered (§4.9) and, if
/// `sql_server` is configured, triggers `sql_health::check_and_recover`
/// before returning so the next dispatch pass finds a server that has at
/// least attempted to recover.
pub async fn run(
    bd: &dyn BdClient,
    town_root: &Path,
    live_rigs: &[PathBuf],
    sql_server: Option<&dyn SqlServerAdapter>,
) -> Result<OrphanCleanupReport, DispatchError> {
    let live_names: BTreeSet<&str> = live_rigs
        .iter()
        .filter_map(|p| p.file_name().and_then(|n| n.to_str()))
        .collect();

    let closed = bd.list_closed_queue_entries(town_root).await?;
    let mut report = OrphanCleanupReport::default();

    for entry in closed {
        if live_names.contains(entry.payload.target_rig.as_str()) {
            continue;
        }

        match bd.delete_queue_entry(town_root, &entry.id).await {
            Ok(()) => report.deleted.push(entry.id),
            Err(BdError::ReadOnly) => {
                telemetry::orphan_cleanup_aborted(&entry.id);
                report.aborted_on_read_only = true;
                if let Some(server) = sql_server {
                    crate::sql_health::check_and_recover(server).await?;
                }
                return Ok(report);
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(report)
}

#[cfg(test)]
#[path = "orphan_cleanup_tests.rs"]
mod tests;
