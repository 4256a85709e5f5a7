// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Telemetry events (§4.7, §4.8): realized as structured `tracing` events
//! under a stable target, rather than a bespoke transport.

use town_core::QueueEntryId;

const TARGET: &str = "town_dispatch::telemetry";

/// Emitted when an entry's failure counter reaches `MAX_DISPATCH_FAILURES`.
pub fn circuit_broken(id: &QueueEntryId, dispatch_failures: u32) {
    tracing::warn!(target: TARGET, event = "circuit-broken", entry_id = %id, dispatch_failures, "queue entry circuit-broken");
}

/// Emitted when a last-resort close after a successful launch succeeds
/// (§4.7 step 2): the launch worked but bookkeeping failed, recovered.
pub fn close_retry(id: &QueueEntryId) {
    tracing::warn!(target: TARGET, event = "close-retry", entry_id = %id, "last-resort close succeeded after OnSuccess failure");
}

/// Emitted when the last-resort close itself fails (§4.7 step 3): names
/// the double-dispatch risk on the next pass.
pub fn close_retry_failed(id: &QueueEntryId) {
    tracing::error!(target: TARGET, event = "close-retry-failed", entry_id = %id, "CRITICAL: queue entry may double-dispatch on next pass");
}

/// Emitted once per dispatched entry.
pub fn dispatched(id: &QueueEntryId, polecat_name: Option<&str>) {
    tracing::info!(target: TARGET, event = "dispatched", entry_id = %id, polecat_name = ?polecat_name, "queue entry dispatched");
}

/// Emitted when the SQL server is found read-only and recovery begins.
pub fn sql_server_readonly_detected() {
    tracing::warn!(target: TARGET, event = "sql-server-readonly", "sql server read-only, suspending dispatch and restarting");
}

/// Emitted when orphan cleanup aborts a sweep on its first read-only write
/// (§4.9): names the entry it was deleting when the server turned read-only.
pub fn orphan_cleanup_aborted(id: &QueueEntryId) {
    tracing::warn!(target: TARGET, event = "orphan-cleanup-aborted", entry_id = %id, "orphan cleanup aborted on read-only write");
}
