// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `bd` row-level client trait (§4.1, §6).
//!
//! `bd` is treated as a black-box command-line database client: the
//! scheduler never talks SQL directly. Real implementations shell out;
//! tests substitute [`FakeBdClient`](crate::fake::FakeBdClient).

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use town_core::{CloseReason, QueueEntry, QueueEntryId, QueuePayload, ReadyBead, WorkBead};

/// Errors from a `bd` invocation.
#[derive(Debug, Error)]
pub enum BdError {
    #[error("bd command failed: {0}")]
    CommandFailed(String),
    #[error("bd returned unparsable output: {0}")]
    InvalidOutput(String),
    #[error("sql server is read-only")]
    ReadOnly,
    #[error("queue entry not found: {0}")]
    NotFound(String),
}

/// Row-level operations against the shared SQL database, fronted by the
/// `bd` tool.
#[async_trait]
pub trait BdClient: Send + Sync + 'static {
    /// `bd list --all --json --limit=0` in `rig_dir` (§6).
    async fn list_all_work_beads(&self, rig_dir: &Path) -> Result<Vec<WorkBead>, BdError>;

    /// `bd ready --json --limit=0` in `rig_dir` (§6).
    async fn ready_work_beads(&self, rig_dir: &Path) -> Result<Vec<ReadyBead>, BdError>;

    /// All open queue entries in the town-root database (§4.1 `list_open`).
    async fn list_open_queue_entries(&self, town_root: &Path) -> Result<Vec<QueueEntry>, BdError>;

    /// All closed queue entries in the town-root database. Used only by
    /// orphan cleanup (§4.9) to find terminal rows eligible for permanent
    /// deletion; the regular dispatch pass never needs closed rows.
    async fn list_closed_queue_entries(&self, town_root: &Path) -> Result<Vec<QueueEntry>, BdError>;

    /// Create a new (open) queue entry. Idempotent-by-design: duplicate rows
    /// for the same `work_bead_id` are tolerated (§9).
    async fn create_queue_entry(
        &self,
        town_root: &Path,
        title: &str,
        payload: &QueuePayload,
    ) -> Result<QueueEntryId, BdError>;

    /// Close an open queue entry with a terminal reason (§4.1 `close`).
    async fn close_queue_entry(
        &self,
        town_root: &Path,
        id: &QueueEntryId,
        reason: CloseReason,
    ) -> Result<(), BdError>;

    /// Overwrite a queue entry's payload in place (§4.1 `update_payload`).
    async fn update_queue_payload(
        &self,
        town_root: &Path,
        id: &QueueEntryId,
        payload: &QueuePayload,
    ) -> Result<(), BdError>;

    /// Permanently remove a closed queue entry's row. Unlike `close`, this
    /// is irreversible and is only ever invoked by orphan cleanup (§4.9) —
    /// the dispatch pass itself never deletes rows, only closes them.
    async fn delete_queue_entry(&self, town_root: &Path, id: &QueueEntryId) -> Result<(), BdError>;
}
