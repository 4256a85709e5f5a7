// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch Cycle (§4.6–§4.8): threads planning and callback invocation for
//! one pass. `Execute` runs at most once per selected entry; `OnSuccess`
//! (the post-launch close) may be retried up to two times with a short
//! backoff; `OnFailure` runs exactly once per entry that ends in a failed
//! state.

use std::collections::BTreeSet;
use std::path::Path;
use std::time::Duration;

use serde::Serialize;
use town_bd::BdClient;
use town_core::{CloseReason, QueueEntry, QueueEntryId, TownSettings};

use crate::error::DispatchError;
use crate::{capacity, lock, planner, reconciler, state_store, telemetry, workspace};
use town_adapters::{LaunchHook, SessionAdapter, SqlServerAdapter};

/// Backoff between `OnSuccess` (close) retries (§4.6).
const CLOSE_RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Result of one dispatch launch attempt.
#[derive(Debug, Clone, Serialize)]
pub struct LaunchedEntry {
    pub id: QueueEntryId,
    pub polecat_name: Option<String>,
}

/// Everything that happened in one pass. Serializes directly for
/// `scheduler run --dry-run`'s structured plan output (§6).
#[derive(Debug, Default, Serialize)]
pub struct PassOutcome {
    pub reason: String,
    pub dispatched: Vec<LaunchedEntry>,
    pub reconciled: usize,
    pub skipped: usize,
    /// Entries whose launch attempt errored this pass (§4.8), whether or
    /// not the error tripped the circuit breaker.
    pub failed: usize,
    /// Entries the planner selected but that a `dry_run` pass did not
    /// actually launch.
    pub would_dispatch: Vec<QueueEntryId>,
}

/// Per-invocation overrides for `run_pass` (§6: `--batch`, `--dry-run`).
#[derive(Debug, Clone, Default)]
pub struct PassOptions {
    /// Overrides `settings.batch_size` for this pass only.
    pub batch_override: Option<u32>,
    /// Plan but never launch or mutate queue state; the plan's picks are
    /// reported via `PassOutcome::would_dispatch`.
    pub dry_run: bool,
}

/// Run one dispatch pass against `town_root`. Acquires the dispatch lock
/// non-blocking (§5); a contended lock is not an error, it's an empty
/// outcome with reason `"lock-contended"`.
#[allow(clippy::too_many_arguments)]
pub async fn run_pass(
    town_root: &Path,
    bd: &dyn BdClient,
    sessions: &dyn SessionAdapter,
    launcher: &dyn LaunchHook,
    sql_server: Option<&dyn SqlServerAdapter>,
    opts: PassOptions,
) -> Result<PassOutcome, DispatchError> {
    let Some(_lock) = lock::try_acquire(town_root).map_err(DispatchError::Lock)? else {
        return Ok(PassOutcome {
            reason: "lock-contended".to_string(),
            ..Default::default()
        });
    };

    let mut settings = TownSettings::load_or_default(town_root);
    if let Some(batch) = opts.batch_override {
        settings.batch_size = batch;
    }
    let state = state_store::load(town_root);

    if state.paused {
        return Ok(PassOutcome {
            reason: "paused".to_string(),
            ..Default::default()
        });
    }
    if settings.dispatch_disabled() {
        return Ok(PassOutcome {
            reason: "disabled".to_string(),
            ..Default::default()
        });
    }

    if let Some(server) = sql_server {
        let health = crate::sql_health::check_and_recover(server).await?;
        if !crate::sql_health::dispatch_allowed(health) {
            return Ok(PassOutcome {
                reason: "sql-server-readonly".to_string(),
                ..Default::default()
            });
        }
    }

    let rigs = workspace::discover_rigs(town_root).map_err(DispatchError::Workspace)?;

    let open_before = bd.list_open_queue_entries(town_root).await?;
    let reconcile_report = reconciler::reconcile(bd, town_root, &rigs, &open_before).await?;

    let open_after = bd.list_open_queue_entries(town_root).await?;
    let ready = crate::readiness::query_ready(bd, &rigs).await?;

    let ready_entries: Vec<QueueEntry> = open_after
        .into_iter()
        .filter(|e| {
            ready
                .get(&e.payload.target_rig)
                .is_some_and(|ids| ids.contains(&e.payload.work_bead_id))
        })
        .collect();
    let deduped = planner::dedup_by_work_bead(ready_entries);

    let capacity = capacity::available_capacity(sessions, settings.max_polecats).await?;
    let plan = planner::plan(capacity, &deduped, settings.batch_size);

    if opts.dry_run {
        return Ok(PassOutcome {
            reason: format!("dry-run:{}", plan.reason),
            would_dispatch: plan.to_dispatch.iter().map(|e| e.id.clone()).collect(),
            reconciled: reconcile_report.closed.len(),
            skipped: plan.skipped,
            dispatched: Vec::new(),
            failed: 0,
        });
    }

    let mut dispatched = Vec::new();
    let mut failed = 0usize;
    let mut launched_rigs = BTreeSet::new();

    for entry in &plan.to_dispatch {
        let rig_dir = town_root.join(&entry.payload.target_rig);
        let name = format!("polecat-{}", entry.payload.work_bead_id);

        match launcher.launch(&name, &rig_dir, &entry.payload.launch_params).await {
            Ok(outcome) => {
                if close_with_retries(bd, town_root, &entry.id).await {
                    telemetry::dispatched(&entry.id, outcome.polecat_name.as_deref());
                    dispatched.push(LaunchedEntry {
                        id: entry.id.clone(),
                        polecat_name: outcome.polecat_name,
                    });
                    launched_rigs.insert(entry.payload.target_rig.clone());
                } else if last_resort_close(bd, town_root, &entry.id).await {
                    telemetry::close_retry(&entry.id);
                    // Launch succeeded; never increment dispatch_failures here (§4.7 step 2).
                } else {
                    telemetry::close_retry_failed(&entry.id);
                }
                // A polecat was genuinely spawned in every branch above, whichever
                // close path recovered it, so the throttle applies regardless (§4.7).
                tokio::time::sleep(settings.spawn_delay()).await;
            }
            Err(e) => {
                failed += 1;
                record_failure(bd, town_root, entry, &e.to_string()).await?;
            }
        }
    }

    for rig in &launched_rigs {
        tracing::info!(target: "town_dispatch::telemetry", event = "notify-rig", rig = %rig, "notifying rig of new dispatch");
    }

    // Reload-then-write (§3, §5): a concurrent `pause`/`resume` may have
    // landed while this pass ran, so the dispatch count is folded into the
    // *current* document rather than the stale snapshot read at line 81.
    let count = dispatched.len() as u32;
    state_store::update(town_root, |s| s.record_dispatch(now_ms(), count)).map_err(DispatchError::Lock)?;

    Ok(PassOutcome {
        reason: plan.reason,
        dispatched,
        reconciled: reconcile_report.closed.len(),
        skipped: plan.skipped,
        failed,
        would_dispatch: Vec::new(),
    })
}

/// Attempt to close a successfully-launched entry with reason `dispatched`,
/// retrying up to two additional times with a short backoff (§4.6).
async fn close_with_retries(bd: &dyn BdClient, town_root: &Path, id: &QueueEntryId) -> bool {
    for attempt in 0..3 {
        if attempt > 0 {
            tokio::time::sleep(CLOSE_RETRY_BACKOFF).await;
        }
        if bd.close_queue_entry(town_root, id, CloseReason::Dispatched).await.is_ok() {
            return true;
        }
    }
    false
}

/// The launch succeeded but `OnSuccess` failed after all retries (§4.7's
/// `ErrOnSuccessFailed` case): one final attempt to close with a
/// distinguished reason, never incrementing the failure counter.
async fn last_resort_close(bd: &dyn BdClient, town_root: &Path, id: &QueueEntryId) -> bool {
    bd.close_queue_entry(town_root, id, CloseReason::DispatchCloseFailed)
        .await
        .is_ok()
}

/// True launch failure (§4.8): increment `dispatch_failures`, store
/// `last_failure`, persist the payload, and circuit-break if the counter
/// reaches the limit.
async fn record_failure(
    bd: &dyn BdClient,
    town_root: &Path,
    entry: &QueueEntry,
    message: &str,
) -> Result<(), DispatchError> {
    let mut payload = entry.payload.clone();
    payload.record_failure(message);
    bd.update_queue_payload(town_root, &entry.id, &payload).await?;

    if payload.is_circuit_broken() {
        bd.close_queue_entry(town_root, &entry.id, CloseReason::CircuitBroken).await?;
        telemetry::circuit_broken(&entry.id, payload.dispatch_failures);
    }

    Ok(())
}

fn now_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
#[path = "cycle_tests.rs"]
mod tests;
