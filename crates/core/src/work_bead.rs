// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Work bead status as observed from a rig-local database (§3).

use serde::{Deserialize, Serialize};

/// Observable status of a work bead. The scheduler treats the bead itself
/// as opaque; only this status (and its id) drive dispatch decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkBeadStatus {
    Open,
    InProgress,
    Hooked,
    Closed,
    Tombstone,
}

impl WorkBeadStatus {
    /// True for statuses that mean "an agent is already handling this, or
    /// it's done" — i.e. the corresponding queue entry is stale (§4.5 rule 3).
    pub fn is_stale_for_dispatch(self) -> bool {
        matches!(
            self,
            WorkBeadStatus::Hooked | WorkBeadStatus::Closed | WorkBeadStatus::Tombstone
        )
    }
}

impl std::fmt::Display for WorkBeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            WorkBeadStatus::Open => "open",
            WorkBeadStatus::InProgress => "in_progress",
            WorkBeadStatus::Hooked => "hooked",
            WorkBeadStatus::Closed => "closed",
            WorkBeadStatus::Tombstone => "tombstone",
        };
        write!(f, "{s}")
    }
}

/// A work bead as returned by `bd list --all --json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkBead {
    pub id: String,
    pub status: WorkBeadStatus,
    #[serde(default)]
    pub title: String,
}

/// A ready (unblocked, open) work bead as returned by `bd ready --json`.
/// Identified purely by id (§4.4).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadyBead {
    pub id: String,
}

#[cfg(test)]
#[path = "work_bead_tests.rs"]
mod tests;
