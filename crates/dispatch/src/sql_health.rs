// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! SQL Server Health (§4.9): between dispatch passes and on demand, probes
//! the shared database for read-only mode and coordinates restart. While
//! read-only, the cycle treats capacity as zero.

use std::time::Duration;

use town_adapters::{ServerHealth, SqlServerAdapter};
use town_core::TownError;

use crate::error::DispatchError;
use crate::telemetry;

/// Bound on how long one restart attempt may take to bring the server back
/// to `Healthy` (§7 `ServerStartTimeout`: "no autorecovery beyond one
/// restart" — past this, the scheduler gives up rather than retrying).
const RESTART_TIMEOUT: Duration = Duration::from_secs(60);

/// Probe the server; if read-only, stop/start/re-probe it (§4.9 state
/// machine). Returns the health observed *after* any recovery attempt.
/// Surfaces `TownError::ServerStartTimeout` if the restart doesn't
/// complete within `RESTART_TIMEOUT`.
pub async fn check_and_recover(server: &dyn SqlServerAdapter) -> Result<ServerHealth, DispatchError> {
    let health = server.probe_write().await?;
    if health != ServerHealth::ReadOnly {
        return Ok(health);
    }

    telemetry::sql_server_readonly_detected();
    match tokio::time::timeout(RESTART_TIMEOUT, server.restart()).await {
        Ok(result) => Ok(result?),
        Err(_elapsed) => Err(DispatchError::Town(TownError::ServerStartTimeout)),
    }
}

/// Dispatch is suspended while the server is read-only: the cycle treats it
/// as capacity=0 regardless of `available_capacity`'s own arithmetic.
pub fn dispatch_allowed(health: ServerHealth) -> bool {
    health == ServerHealth::Healthy
}

#[cfg(test)]
#[path = "sql_health_tests.rs"]
mod tests;
