// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler status snapshot, backing `scheduler status -o json` (§6).

use serde::Serialize;
use std::path::Path;

use town_adapters::SessionAdapter;
use town_bd::BdClient;
use town_core::TownSettings;

use crate::capacity;
use crate::error::DispatchError;
use crate::readiness;
use crate::state_store;
use crate::workspace;

/// Read-only snapshot of scheduler state for operator-facing reporting.
#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub paused: bool,
    pub paused_by: Option<String>,
    pub queued_total: usize,
    pub queued_ready: usize,
    pub active_polecats: i64,
    pub max_polecats: i64,
    pub last_dispatch_at: Option<i64>,
    pub last_dispatch_count: u32,
}

/// Assemble a status snapshot without mutating anything or taking the
/// dispatch lock; safe to call concurrently with a running pass.
pub async fn build_status(
    town_root: &Path,
    bd: &dyn BdClient,
    sessions: &dyn SessionAdapter,
) -> Result<SchedulerStatus, DispatchError> {
    let settings = TownSettings::load_or_default(town_root);
    let state = state_store::load(town_root);

    let rigs = workspace::discover_rigs(town_root).map_err(DispatchError::Workspace)?;
    let entries = bd.list_open_queue_entries(town_root).await?;
    let ready = readiness::query_ready(bd, &rigs).await.unwrap_or_default();

    let queued_ready = entries
        .iter()
        .filter(|e| {
            ready
                .get(&e.payload.target_rig)
                .is_some_and(|ids| ids.contains(&e.payload.work_bead_id))
        })
        .count();

    let active_polecats = capacity::available_capacity(sessions, settings.max_polecats)
        .await
        .map(|available| settings.max_polecats - available)
        .unwrap_or(0);

    Ok(SchedulerStatus {
        paused: state.paused,
        paused_by: state.paused_by,
        queued_total: entries.len(),
        queued_ready,
        active_polecats,
        max_polecats: settings.max_polecats,
        last_dispatch_at: state.last_dispatch_at,
        last_dispatch_count: state.last_dispatch_count,
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
