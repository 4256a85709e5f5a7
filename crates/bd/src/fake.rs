// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory fake `bd` client for deterministic testing (§9: "Tests supply
//! a recording stub that returns canned outcomes, enabling all scenarios in
//! §8 without a database.").

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use town_core::{CloseReason, QueueEntry, QueueEntryId, QueueEntryStatus, QueuePayload, ReadyBead, WorkBead};

use crate::client::{BdClient, BdError};

/// Recorded call, for assertions in tests that care about invocation shape.
#[derive(Debug, Clone)]
pub enum BdCall {
    ListAllWorkBeads { rig_dir: PathBuf },
    ReadyWorkBeads { rig_dir: PathBuf },
    ListOpenQueueEntries,
    ListClosedQueueEntries,
    CreateQueueEntry { title: String },
    CloseQueueEntry { id: QueueEntryId, reason: CloseReason },
    UpdateQueuePayload { id: QueueEntryId },
    DeleteQueueEntry { id: QueueEntryId },
}

#[derive(Default)]
struct FakeState {
    entries: HashMap<String, QueueEntry>,
    work_beads: HashMap<PathBuf, Vec<WorkBead>>,
    ready: HashMap<PathBuf, Vec<ReadyBead>>,
    calls: Vec<BdCall>,
    /// Directories whose next `list_all`/`ready` call should fail, modeling
    /// a per-rig failure (§4.4).
    failing_dirs: std::collections::HashSet<PathBuf>,
    /// When true, every mutating call returns `BdError::ReadOnly` (§4.9).
    read_only: bool,
    next_id: u64,
}

/// Fake `bd` client backed by in-memory state.
#[derive(Clone, Default)]
pub struct FakeBdClient {
    inner: Arc<Mutex<FakeState>>,
}

impl FakeBdClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<BdCall> {
        self.inner.lock().calls.clone()
    }

    pub fn set_work_beads(&self, rig_dir: impl Into<PathBuf>, beads: Vec<WorkBead>) {
        self.inner.lock().work_beads.insert(rig_dir.into(), beads);
    }

    pub fn set_ready(&self, rig_dir: impl Into<PathBuf>, ready: Vec<ReadyBead>) {
        self.inner.lock().ready.insert(rig_dir.into(), ready);
    }

    pub fn fail_dir(&self, rig_dir: impl Into<PathBuf>) {
        self.inner.lock().failing_dirs.insert(rig_dir.into());
    }

    pub fn set_read_only(&self, read_only: bool) {
        self.inner.lock().read_only = read_only;
    }

    pub fn seed_entry(&self, entry: QueueEntry) {
        self.inner.lock().entries.insert(entry.id.as_str().to_string(), entry);
    }

    pub fn get_entry(&self, id: &str) -> Option<QueueEntry> {
        self.inner.lock().entries.get(id).cloned()
    }

    pub fn entries(&self) -> Vec<QueueEntry> {
        self.inner.lock().entries.values().cloned().collect()
    }
}

#[async_trait]
impl BdClient for FakeBdClient {
    async fn list_all_work_beads(&self, rig_dir: &Path) -> Result<Vec<WorkBead>, BdError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BdCall::ListAllWorkBeads {
            rig_dir: rig_dir.to_path_buf(),
        });
        if inner.failing_dirs.contains(rig_dir) {
            return Err(BdError::CommandFailed(format!(
                "fake failure for {}",
                rig_dir.display()
            )));
        }
        Ok(inner.work_beads.get(rig_dir).cloned().unwrap_or_default())
    }

    async fn ready_work_beads(&self, rig_dir: &Path) -> Result<Vec<ReadyBead>, BdError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BdCall::ReadyWorkBeads {
            rig_dir: rig_dir.to_path_buf(),
        });
        if inner.failing_dirs.contains(rig_dir) {
            return Err(BdError::CommandFailed(format!(
                "fake failure for {}",
                rig_dir.display()
            )));
        }
        Ok(inner.ready.get(rig_dir).cloned().unwrap_or_default())
    }

    async fn list_open_queue_entries(&self, _town_root: &Path) -> Result<Vec<QueueEntry>, BdError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BdCall::ListOpenQueueEntries);
        Ok(inner
            .entries
            .values()
            .filter(|e| e.status == QueueEntryStatus::Open)
            .cloned()
            .collect())
    }

    async fn list_closed_queue_entries(&self, _town_root: &Path) -> Result<Vec<QueueEntry>, BdError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BdCall::ListClosedQueueEntries);
        Ok(inner
            .entries
            .values()
            .filter(|e| e.status == QueueEntryStatus::Closed)
            .cloned()
            .collect())
    }

    async fn create_queue_entry(
        &self,
        _town_root: &Path,
        title: &str,
        payload: &QueuePayload,
    ) -> Result<QueueEntryId, BdError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BdCall::CreateQueueEntry {
            title: title.to_string(),
        });
        if inner.read_only {
            return Err(BdError::ReadOnly);
        }
        inner.next_id += 1;
        let id = QueueEntryId::new(format!("qe-{}", inner.next_id));
        let entry = QueueEntry {
            id: id.clone(),
            title: title.to_string(),
            status: QueueEntryStatus::Open,
            payload: payload.clone(),
            created_at: payload.enqueued_at,
            updated_at: payload.enqueued_at,
        };
        inner.entries.insert(id.as_str().to_string(), entry);
        Ok(id)
    }

    async fn close_queue_entry(
        &self,
        _town_root: &Path,
        id: &QueueEntryId,
        reason: CloseReason,
    ) -> Result<(), BdError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BdCall::CloseQueueEntry {
            id: id.clone(),
            reason,
        });
        if inner.read_only {
            return Err(BdError::ReadOnly);
        }
        match inner.entries.get_mut(id.as_str()) {
            Some(entry) => {
                entry.status = QueueEntryStatus::Closed;
                Ok(())
            }
            None => Err(BdError::NotFound(id.to_string())),
        }
    }

    async fn update_queue_payload(
        &self,
        _town_root: &Path,
        id: &QueueEntryId,
        payload: &QueuePayload,
    ) -> Result<(), BdError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BdCall::UpdateQueuePayload { id: id.clone() });
        if inner.read_only {
            return Err(BdError::ReadOnly);
        }
        match inner.entries.get_mut(id.as_str()) {
            Some(entry) => {
                entry.payload = payload.clone();
                Ok(())
            }
            None => Err(BdError::NotFound(id.to_string())),
        }
    }

    async fn delete_queue_entry(&self, _town_root: &Path, id: &QueueEntryId) -> Result<(), BdError> {
        let mut inner = self.inner.lock();
        inner.calls.push(BdCall::DeleteQueueEntry { id: id.clone() });
        if inner.read_only {
            return Err(BdError::ReadOnly);
        }
        match inner.entries.remove(id.as_str()) {
            Some(_) => Ok(()),
            None => Err(BdError::NotFound(id.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
