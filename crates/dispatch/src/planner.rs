// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch Cycle planner (§4.6): a pure function with no side effects.

use std::collections::HashMap;

use town_core::{DispatchPlan, QueueEntry};

/// Deduplicate entries by `work_bead_id`, keeping the one with the smallest
/// `enqueued_at` (§3 invariant 2, §5 ordering guarantees). Callers are
/// expected to have already dropped invalid-context entries via the
/// reconciler; entries with an empty `work_bead_id` still sort last here as
/// a defensive fallback.
pub fn dedup_by_work_bead(entries: Vec<QueueEntry>) -> Vec<QueueEntry> {
    let mut winners: HashMap<String, QueueEntry> = HashMap::new();
    for entry in entries {
        if entry.payload.work_bead_id.is_empty() {
            continue;
        }
        match winners.get(&entry.payload.work_bead_id) {
            Some(existing) if existing.payload.enqueued_at <= entry.payload.enqueued_at => {}
            _ => {
                winners.insert(entry.payload.work_bead_id.clone(), entry);
            }
        }
    }
    let mut out: Vec<QueueEntry> = winners.into_values().collect();
    out.sort_by_key(|e| e.payload.enqueued_at);
    out
}

/// Select entries to launch this pass. `ready` must already be deduplicated
/// and sorted in FIFO order by `enqueued_at` (§4.6, §5).
pub fn plan(available_capacity: i64, ready: &[QueueEntry], batch_size: u32) -> DispatchPlan {
    if available_capacity <= 0 {
        return DispatchPlan::empty("no-capacity");
    }
    if ready.is_empty() {
        return DispatchPlan::empty("none");
    }

    let take = (available_capacity as usize).min(batch_size as usize).min(ready.len());
    let to_dispatch: Vec<QueueEntry> = ready[..take].to_vec();
    let skipped = ready.len() - take;

    DispatchPlan {
        to_dispatch,
        skipped,
        reason: "planned".to_string(),
    }
}

#[cfg(test)]
#[path = "planner_tests.rs"]
mod tests;
