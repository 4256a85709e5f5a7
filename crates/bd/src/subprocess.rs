// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess execution helpers shared by the `bd` client.

use std::process::Output;
use std::time::Duration;
use tokio::process::Command;

/// Default timeout for `bd` row-level queries (§6).
pub const BD_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable the `bd` subprocess reads to locate its database.
/// An inherited value pointing at the wrong directory is a known hazard
/// (§6) — callers must always set this explicitly rather than append to it.
pub const BD_DATA_DIR_VAR: &str = "BD_DATA_DIR";

/// Run a subprocess command with a timeout, pinning `BD_DATA_DIR` to `dir`
/// and clearing any inherited value first.
pub async fn run_bd(
    bd_binary: &str,
    dir: &std::path::Path,
    args: &[&str],
    timeout: Duration,
) -> Result<Output, String> {
    let mut cmd = Command::new(bd_binary);
    cmd.args(args).current_dir(dir).env_remove(BD_DATA_DIR_VAR);
    cmd.env(BD_DATA_DIR_VAR, dir);

    match tokio::time::timeout(timeout, cmd.output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(io_err)) => Err(format!("bd {:?} failed: {}", args, io_err)),
        Err(_elapsed) => Err(format!(
            "bd {:?} timed out after {}s",
            args,
            timeout.as_secs()
        )),
    }
}
