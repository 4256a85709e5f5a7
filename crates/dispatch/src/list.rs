// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Grouped queue listing, backing `scheduler list -o json` (§6). Entries are
//! grouped by target rig and flagged `blocked` when they're open but not
//! yet surfaced by the readiness query.

use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;

use town_bd::BdClient;

use crate::error::DispatchError;
use crate::readiness;
use crate::workspace;

#[derive(Debug, Clone, Serialize)]
pub struct ListedEntry {
    pub id: String,
    pub work_bead_id: String,
    pub status: String,
    pub blocked: bool,
    pub dispatch_failures: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RigGroup {
    pub rig: String,
    pub entries: Vec<ListedEntry>,
}

/// List open queue entries grouped by `target_rig`, sorted by rig name and
/// then by `work_bead_id` within each group.
pub async fn list_grouped(town_root: &Path, bd: &dyn BdClient) -> Result<Vec<RigGroup>, DispatchError> {
    let rigs = workspace::discover_rigs(town_root).map_err(DispatchError::Workspace)?;
    let ready = readiness::query_ready(bd, &rigs).await.unwrap_or_default();

    let entries = bd.list_open_queue_entries(town_root).await?;
    let mut grouped: HashMap<String, Vec<ListedEntry>> = HashMap::new();

    for entry in entries {
        let blocked = !ready
            .get(&entry.payload.target_rig)
            .is_some_and(|ids| ids.contains(&entry.payload.work_bead_id));

        grouped
            .entry(entry.payload.target_rig.clone())
            .or_default()
            .push(ListedEntry {
                id: entry.id.to_string(),
                work_bead_id: entry.payload.work_bead_id.clone(),
                status: entry.status.to_string(),
                blocked,
                dispatch_failures: entry.payload.dispatch_failures,
            });
    }

    let mut groups: Vec<RigGroup> = grouped
        .into_iter()
        .map(|(rig, mut entries)| {
            entries.sort_by(|a, b| a.work_bead_id.cmp(&b.work_bead_id));
            RigGroup { rig, entries }
        })
        .collect();
    groups.sort_by(|a, b| a.rig.cmp(&b.rig));
    Ok(groups)
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
