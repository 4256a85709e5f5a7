// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Readiness Query (§4.4): per-rig "which work items are unblocked" query,
//! unioned across rigs. A per-rig failure is logged and skipped; the pass
//! fails only if every rig fails.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use town_bd::BdClient;

use crate::error::DispatchError;

/// Ready work-bead ids, keyed by rig name (the rig directory's file name).
/// A ready item is identified purely by id (§4.4); the scheduler does not
/// inspect dependency structure.
pub type ReadySet = HashMap<String, HashSet<String>>;

/// Query readiness for every rig in `rigs`, skipping parked rigs (§9) and
/// rigs whose query fails. Returns `ReadinessAllFailed` only when every
/// non-parked rig failed.
pub async fn query_ready(bd: &dyn BdClient, rigs: &[std::path::PathBuf]) -> Result<ReadySet, DispatchError> {
    let mut ready = ReadySet::new();
    let mut attempted = 0usize;
    let mut failed = 0usize;

    for rig_dir in rigs {
        if crate::workspace::is_parked(rig_dir) {
            continue;
        }
        attempted += 1;
        let Some(name) = rig_name(rig_dir) else { continue };

        match bd.ready_work_beads(rig_dir).await {
            Ok(beads) => {
                ready.insert(name, beads.into_iter().map(|b| b.id).collect());
            }
            Err(e) => {
                failed += 1;
                tracing::warn!(rig = %name, error = %e, "readiness query failed for rig, skipping");
            }
        }
    }

    if attempted > 0 && failed == attempted {
        return Err(DispatchError::Town(town_core::TownError::ReadinessAllFailed(format!(
            "all {failed} rig(s) failed readiness query"
        ))));
    }

    Ok(ready)
}

fn rig_name(rig_dir: &Path) -> Option<String> {
    rig_dir.file_name().and_then(|n| n.to_str()).map(str::to_string)
}

#[cfg(test)]
#[path = "readiness_tests.rs"]
mod tests;
