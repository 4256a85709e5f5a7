// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The queue entry ("sling context") data model.
//!
//! A queue entry is a row in the town-root database recording a pending
//! launch for a work bead. See §3 and §4.1 of the dispatch specification.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

crate::define_id! {
    /// Unique identifier for a queue entry.
    pub struct QueueEntryId;
}

/// Terminal-once status of a queue entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueueEntryStatus {
    Open,
    Closed,
}

impl std::fmt::Display for QueueEntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueueEntryStatus::Open => write!(f, "open"),
            QueueEntryStatus::Closed => write!(f, "closed"),
        }
    }
}

/// Reason a queue entry was closed. Carried through telemetry and `list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CloseReason {
    Dispatched,
    CircuitBroken,
    StaleWorkBead,
    InvalidContext,
    Cleared,
    DispatchCloseFailed,
}

impl std::fmt::Display for CloseReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            CloseReason::Dispatched => "dispatched",
            CloseReason::CircuitBroken => "circuit-broken",
            CloseReason::StaleWorkBead => "stale-work-bead",
            CloseReason::InvalidContext => "invalid-context",
            CloseReason::Cleared => "cleared",
            CloseReason::DispatchCloseFailed => "dispatch-close-failed",
        };
        write!(f, "{s}")
    }
}

/// Number of consecutive launch failures after which a queue entry is
/// circuit-broken (§4.8). The source treats this as a constant; see
/// DESIGN.md for why it stays a constant here too.
pub const MAX_DISPATCH_FAILURES: u32 = 3;

/// The payload carried by a queue entry (§3).
///
/// `launch_params` is treated as an opaque, immutable-once-enqueued bundle:
/// we round-trip it as a JSON value rather than modeling its internal shape,
/// since the scheduler never inspects it beyond passing it to the launcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueuePayload {
    pub work_bead_id: String,
    pub target_rig: String,
    pub enqueued_at: i64,
    #[serde(default)]
    pub dispatch_failures: u32,
    #[serde(default)]
    pub last_failure: String,
    #[serde(default)]
    pub launch_params: serde_json::Value,
    /// Unknown keys encountered while decoding, preserved for forward
    /// compatibility and re-encoded verbatim on the next write.
    #[serde(skip)]
    pub extra: BTreeMap<String, String>,
}

impl QueuePayload {
    pub fn new(work_bead_id: impl Into<String>, target_rig: impl Into<String>, enqueued_at: i64) -> Self {
        Self {
            work_bead_id: work_bead_id.into(),
            target_rig: target_rig.into(),
            enqueued_at,
            dispatch_failures: 0,
            last_failure: String::new(),
            launch_params: serde_json::Value::Null,
            extra: BTreeMap::new(),
        }
    }

    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.dispatch_failures += 1;
        self.last_failure = message.into();
    }

    pub fn is_circuit_broken(&self) -> bool {
        self.dispatch_failures >= MAX_DISPATCH_FAILURES
    }
}

/// One row in the town-root database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: QueueEntryId,
    pub title: String,
    pub status: QueueEntryStatus,
    pub payload: QueuePayload,
    pub created_at: i64,
    pub updated_at: i64,
}

impl QueueEntry {
    pub fn is_open(&self) -> bool {
        self.status == QueueEntryStatus::Open
    }
}

#[cfg(test)]
#[path = "queue_entry_tests.rs"]
mod tests;
