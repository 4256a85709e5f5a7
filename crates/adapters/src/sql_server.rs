// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQL Server health (§4.9): start/stop the shared database process and
//! probe it for read-only mode. Grounded on `subprocess::run_with_timeout`
//! the same way the tmux session adapter shells out, but the target here is
//! a long-running service process rather than a one-shot command.

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;
use tokio::process::Command;

use crate::subprocess::{run_with_timeout, SQL_SERVER_TIMEOUT};

#[derive(Debug, Error)]
pub enum SqlServerError {
    #[error("sql server start failed: {0}")]
    StartFailed(String),
    #[error("sql server stop failed: {0}")]
    StopFailed(String),
    #[error("sql server is in read-only mode")]
    ReadOnly,
    #[error("sql server probe failed: {0}")]
    ProbeFailed(String),
}

/// The scheduler's view of server health (§4.9 state diagram collapses to
/// this for dispatch purposes: anything but `Healthy` means capacity=0).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerHealth {
    Healthy,
    ReadOnly,
    Stopped,
}

/// Adapter for managing and probing the shared SQL server process.
#[async_trait]
pub trait SqlServerAdapter: Send + Sync + 'static {
    /// Start the server; idempotent if already running.
    async fn start(&self) -> Result<(), SqlServerError>;

    /// Stop the server; idempotent if already stopped.
    async fn stop(&self) -> Result<(), SqlServerError>;

    /// Issue a trivial write to detect read-only mode.
    async fn probe_write(&self) -> Result<ServerHealth, SqlServerError>;

    /// Stop, then start, then re-probe. Used on read-only detection.
    async fn restart(&self) -> Result<ServerHealth, SqlServerError> {
        self.stop().await?;
        self.start().await?;
        self.probe_write().await
    }
}

/// Real adapter shelling out to operator-provided start/stop/probe scripts.
/// The scheduler has no built-in knowledge of the database engine; these
/// paths are configured per deployment (§4.9 describes the contract, not a
/// specific database product).
pub struct ProcessSqlServerAdapter {
    start_cmd: String,
    stop_cmd: String,
    probe_cmd: String,
}

impl ProcessSqlServerAdapter {
    pub fn new(start_cmd: impl Into<String>, stop_cmd: impl Into<String>, probe_cmd: impl Into<String>) -> Self {
        Self {
            start_cmd: start_cmd.into(),
            stop_cmd: stop_cmd.into(),
            probe_cmd: probe_cmd.into(),
        }
    }

    async fn run_shell(&self, script: &str, description: &str) -> Result<std::process::Output, String> {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        run_with_timeout(cmd, SQL_SERVER_TIMEOUT, description).await
    }
}

#[async_trait]
impl SqlServerAdapter for ProcessSqlServerAdapter {
    async fn start(&self) -> Result<(), SqlServerError> {
        let output = self
            .run_shell(&self.start_cmd, "sql server start")
            .await
            .map_err(SqlServerError::StartFailed)?;
        if !output.status.success() {
            return Err(SqlServerError::StartFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(())
    }

    async fn stop(&self) -> Result<(), SqlServerError> {
        let output = self
            .run_shell(&self.stop_cmd, "sql server stop")
            .await
            .map_err(SqlServerError::StopFailed)?;
        if !output.status.success() {
            return Err(SqlServerError::StopFailed(
                String::from_utf8_lossy(&output.stderr).into_owned(),
            ));
        }
        Ok(())
    }

    async fn probe_write(&self) -> Result<ServerHealth, SqlServerError> {
        let output = self
            .run_shell(&self.probe_cmd, "sql server probe")
            .await
            .map_err(SqlServerError::ProbeFailed)?;

        if output.status.success() {
            return Ok(ServerHealth::Healthy);
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("read-only") || stderr.contains("read only") {
            return Ok(ServerHealth::ReadOnly);
        }
        Err(SqlServerError::ProbeFailed(stderr.into_owned()))
    }
}

/// Checks stderr text the same way `town_bd::real` detects a read-only `bd`
/// error, so both layers treat the hazard identically.
pub fn looks_read_only(stderr: &str) -> bool {
    stderr.contains("read-only") || stderr.contains("read only")
}

/// No-op placeholder used where the path to the database is irrelevant
/// (e.g. unit tests of unrelated components that still need a `&Path`).
pub fn default_probe_path(town_root: &Path) -> std::path::PathBuf {
    town_root.join(".beads")
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum SqlServerCall {
        Start,
        Stop,
        ProbeWrite,
    }

    #[derive(Default)]
    struct FakeState {
        health: Option<ServerHealth>,
        calls: Vec<SqlServerCall>,
        restart_delay: Option<std::time::Duration>,
    }

    /// Fake SQL server adapter; health defaults to `Healthy` unless
    /// overridden with `set_health`.
    #[derive(Clone, Default)]
    pub struct FakeSqlServer {
        inner: Arc<Mutex<FakeState>>,
    }

    impl FakeSqlServer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_health(&self, health: ServerHealth) {
            self.inner.lock().health = Some(health);
        }

        /// Makes `restart()` sleep before stop/start/re-probe, for exercising
        /// the scheduler's restart-timeout handling.
        pub fn set_restart_delay(&self, delay: std::time::Duration) {
            self.inner.lock().restart_delay = Some(delay);
        }

        pub fn calls(&self) -> Vec<SqlServerCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl SqlServerAdapter for FakeSqlServer {
        async fn start(&self) -> Result<(), SqlServerError> {
            self.inner.lock().calls.push(SqlServerCall::Start);
            Ok(())
        }

        async fn stop(&self) -> Result<(), SqlServerError> {
            self.inner.lock().calls.push(SqlServerCall::Stop);
            Ok(())
        }

        async fn probe_write(&self) -> Result<ServerHealth, SqlServerError> {
            let mut inner = self.inner.lock();
            inner.calls.push(SqlServerCall::ProbeWrite);
            Ok(inner.health.unwrap_or(ServerHealth::Healthy))
        }

        async fn restart(&self) -> Result<ServerHealth, SqlServerError> {
            let delay = self.inner.lock().restart_delay;
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.stop().await?;
            self.start().await?;
            self.probe_write().await
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSqlServer, SqlServerCall};

#[cfg(test)]
#[path = "sql_server_tests.rs"]
mod tests;
