// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-backed `bd` client.

use async_trait::async_trait;
use std::path::Path;
use town_core::{CloseReason, QueueEntry, QueueEntryId, QueuePayload, ReadyBead, WorkBead};

use crate::client::{BdClient, BdError};
use crate::codec;
use crate::subprocess::{run_bd, BD_COMMAND_TIMEOUT};

/// Shells out to a `bd` binary found on `PATH` (or an overridden path).
#[derive(Debug, Clone)]
pub struct SubprocessBdClient {
    bd_binary: String,
}

impl Default for SubprocessBdClient {
    fn default() -> Self {
        Self {
            bd_binary: "bd".to_string(),
        }
    }
}

impl SubprocessBdClient {
    pub fn new(bd_binary: impl Into<String>) -> Self {
        Self {
            bd_binary: bd_binary.into(),
        }
    }

    async fn run(&self, dir: &Path, args: &[&str]) -> Result<Vec<u8>, BdError> {
        let output = run_bd(&self.bd_binary, dir, args, BD_COMMAND_TIMEOUT)
            .await
            .map_err(BdError::CommandFailed)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("read-only") || stderr.contains("read only") {
                return Err(BdError::ReadOnly);
            }
            return Err(BdError::CommandFailed(stderr.into_owned()));
        }

        Ok(output.stdout)
    }

    /// Shared by `list_open_queue_entries`/`list_closed_queue_entries`: both
    /// are the same `queue list --status=...` shape with a different filter.
    async fn list_queue_entries(&self, town_root: &Path, status: &str) -> Result<Vec<QueueEntry>, BdError> {
        let status_arg = format!("--status={status}");
        let stdout = self
            .run(town_root, &["queue", "list", &status_arg, "--json", "--limit=0"])
            .await?;
        let raw: Vec<RawQueueRow> = serde_json::from_slice(&stdout)
            .map_err(|e| BdError::InvalidOutput(e.to_string()))?;
        Ok(raw
            .into_iter()
            .map(|row| {
                let payload = codec::decode(&row.description).unwrap_or_else(|_| {
                    // Unparsable payloads still materialize as entries so the
                    // reconciler can close them with reason invalid-context;
                    // we hand it an empty sentinel payload rather than dropping the row.
                    town_core::QueuePayload::new("", "", 0)
                });
                let status = if row.status == "open" {
                    town_core::QueueEntryStatus::Open
                } else {
                    town_core::QueueEntryStatus::Closed
                };
                QueueEntry {
                    id: QueueEntryId::new(row.id),
                    title: row.title,
                    status,
                    payload,
                    created_at: row.created_at,
                    updated_at: row.updated_at,
                }
            })
            .collect())
    }
}

#[derive(serde::Deserialize)]
struct RawBead {
    id: String,
    status: town_core::WorkBeadStatus,
    #[serde(default)]
    title: String,
}

#[derive(serde::Deserialize)]
struct RawQueueRow {
    id: String,
    title: String,
    status: String,
    description: String,
    created_at: i64,
    updated_at: i64,
}

#[async_trait]
impl BdClient for SubprocessBdClient {
    async fn list_all_work_beads(&self, rig_dir: &Path) -> Result<Vec<WorkBead>, BdError> {
        let stdout = self
            .run(rig_dir, &["list", "--all", "--json", "--limit=0"])
            .await?;
        let raw: Vec<RawBead> = serde_json::from_slice(&stdout)
            .map_err(|e| BdError::InvalidOutput(e.to_string()))?;
        Ok(raw
            .into_iter()
            .map(|r| WorkBead {
                id: r.id,
                status: r.status,
                title: r.title,
            })
            .collect())
    }

    async fn ready_work_beads(&self, rig_dir: &Path) -> Result<Vec<ReadyBead>, BdError> {
        let stdout = self
            .run(rig_dir, &["ready", "--json", "--limit=0"])
            .await?;
        serde_json::from_slice(&stdout).map_err(|e| BdError::InvalidOutput(e.to_string()))
    }

    async fn list_open_queue_entries(&self, town_root: &Path) -> Result<Vec<QueueEntry>, BdError> {
        self.list_queue_entries(town_root, "open").await
    }

    async fn list_closed_queue_entries(&self, town_root: &Path) -> Result<Vec<QueueEntry>, BdError> {
        self.list_queue_entries(town_root, "closed").await
    }

    async fn create_queue_entry(
        &self,
        town_root: &Path,
        title: &str,
        payload: &QueuePayload,
    ) -> Result<QueueEntryId, BdError> {
        let description = codec::encode(payload);
        let title_arg = format!("--title={}", title);
        let desc_arg = format!("--description={}", description);
        let stdout = self
            .run(
                town_root,
                &["queue", "create", &title_arg, &desc_arg, "--json"],
            )
            .await?;
        #[derive(serde::Deserialize)]
        struct Created {
            id: String,
        }
        let created: Created =
            serde_json::from_slice(&stdout).map_err(|e| BdError::InvalidOutput(e.to_string()))?;
        Ok(QueueEntryId::new(created.id))
    }

    async fn close_queue_entry(
        &self,
        town_root: &Path,
        id: &QueueEntryId,
        reason: CloseReason,
    ) -> Result<(), BdError> {
        let reason_arg = format!("--reason={}", reason);
        self.run(
            town_root,
            &["queue", "close", id.as_str(), &reason_arg],
        )
        .await?;
        Ok(())
    }

    async fn update_queue_payload(
        &self,
        town_root: &Path,
        id: &QueueEntryId,
        payload: &QueuePayload,
    ) -> Result<(), BdError> {
        let description = codec::encode(payload);
        let desc_arg = format!("--description={}", description);
        self.run(town_root, &["queue", "update", id.as_str(), &desc_arg])
            .await?;
        Ok(())
    }

    async fn delete_queue_entry(&self, town_root: &Path, id: &QueueEntryId) -> Result<(), BdError> {
        self.run(town_root, &["queue", "delete", id.as_str()]).await?;
        Ok(())
    }
}
