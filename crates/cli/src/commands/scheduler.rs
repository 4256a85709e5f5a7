// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `town scheduler ...` — the dispatch scheduler's operator surface (§6).

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use town_adapters::{ProcessSqlServerAdapter, SessionAdapter, SqlServerAdapter, TmuxAdapter, TmuxLaunchHook};
use town_bd::{BdClient, SubprocessBdClient};
use town_core::CloseReason;
use town_dispatch::{state_store, PassOptions};

use crate::output::{print_json, OutputFormat};
use crate::table::{Column, Table};

#[derive(Subcommand)]
pub enum SchedulerCommand {
    /// Report paused state, queue totals, active polecats, and last dispatch.
    Status,
    /// Enumerate open queue entries grouped by target rig.
    List,
    /// Trigger one dispatch pass.
    Run {
        /// Override `batch_size` for this pass only.
        #[arg(long)]
        batch: Option<u32>,
        /// Plan the pass but never launch anything; reports the planned
        /// entries instead of anything actually dispatched.
        #[arg(long)]
        dry_run: bool,
    },
    /// Pause dispatch: `run` becomes a no-op until `resume`.
    Pause,
    /// Resume dispatch after a `pause`.
    Resume,
    /// Close one (or all) open queue entries with reason `cleared`.
    Clear {
        /// Only clear the entry with this queue entry id; omit to clear all.
        #[arg(long)]
        bead: Option<String>,
    },
    /// Permanently delete closed queue entries whose rig no longer exists
    /// (§4.9). Destructive; aborts and triggers SQL server recovery on the
    /// first read-only write it hits.
    CleanOrphans,
}

/// Dispatch a parsed [`SchedulerCommand`] against `town_root`, using real
/// subprocess-backed adapters. Construction lives here (rather than in
/// `main`) so the command handlers below stay generic over `&dyn` adapters
/// and are exercised against fakes in tests.
pub async fn handle(command: SchedulerCommand, town_root: &Path, format: OutputFormat) -> Result<()> {
    let bd = SubprocessBdClient::new(bd_binary());
    let sessions = TmuxAdapter::new();
    let launcher = TmuxLaunchHook::new(TmuxAdapter::new());
    let sql_server = sql_server_adapter();

    match command {
        SchedulerCommand::Status => status(town_root, &bd, &sessions, format).await,
        SchedulerCommand::List => list(town_root, &bd, format).await,
        SchedulerCommand::Run { batch, dry_run } => {
            run(
                town_root,
                &bd,
                &sessions,
                &launcher,
                sql_server.as_ref().map(|s| s as &dyn SqlServerAdapter),
                batch,
                dry_run,
                format,
            )
            .await
        }
        SchedulerCommand::Pause => pause(town_root),
        SchedulerCommand::Resume => resume(town_root),
        SchedulerCommand::Clear { bead } => clear(town_root, &bd, bead).await,
        SchedulerCommand::CleanOrphans => {
            clean_orphans(town_root, &bd, sql_server.as_ref().map(|s| s as &dyn SqlServerAdapter)).await
        }
    }
}

fn bd_binary() -> String {
    std::env::var("TOWN_BD_BIN").unwrap_or_else(|_| "bd".to_string())
}

/// Built from `TOWN_SQL_{START,STOP,PROBE}_CMD` when all three are set.
/// Absent by default: an unconfigured town simply skips the health check
/// (§4.9 treats a missing adapter as "nothing to check").
fn sql_server_adapter() -> Option<ProcessSqlServerAdapter> {
    let start = std::env::var("TOWN_SQL_START_CMD").ok()?;
    let stop = std::env::var("TOWN_SQL_STOP_CMD").ok()?;
    let probe = std::env::var("TOWN_SQL_PROBE_CMD").ok()?;
    Some(ProcessSqlServerAdapter::new(start, stop, probe))
}

/// `GT_DAEMON=1` marks a pass triggered by the heartbeat rather than an
/// operator at a terminal (§6): suppresses the "nothing dispatched" line.
fn is_daemon_invocation() -> bool {
    std::env::var("GT_DAEMON").as_deref() == Ok("1")
}

fn actor() -> String {
    std::env::var("USER").unwrap_or_else(|_| "operator".to_string())
}

async fn status(town_root: &Path, bd: &dyn BdClient, sessions: &dyn SessionAdapter, format: OutputFormat) -> Result<()> {
    let snapshot = town_dispatch::build_status(town_root, bd, sessions).await?;
    if format == OutputFormat::Json {
        return print_json(&snapshot);
    }

    println!(
        "{}",
        crate::color::status(if snapshot.paused { "paused" } else { "running" })
    );
    if let Some(actor) = &snapshot.paused_by {
        println!("  paused by: {actor}");
    }
    println!("queued: {} ({} ready)", snapshot.queued_total, snapshot.queued_ready);
    println!("polecats: {}/{}", snapshot.active_polecats, snapshot.max_polecats);
    match snapshot.last_dispatch_at {
        Some(at) => println!(
            "last dispatch: {} ago ({} launched)",
            crate::output::format_time_ago(at),
            snapshot.last_dispatch_count
        ),
        None => println!("last dispatch: never"),
    }
    Ok(())
}

async fn list(town_root: &Path, bd: &dyn BdClient, format: OutputFormat) -> Result<()> {
    let groups = town_dispatch::list_grouped(town_root, bd).await?;
    if format == OutputFormat::Json {
        return print_json(&groups);
    }

    if groups.iter().all(|g| g.entries.is_empty()) {
        println!("queue is empty");
        return Ok(());
    }

    let mut table = Table::new(vec![
        Column::left("RIG"),
        Column::left("WORK BEAD"),
        Column::status("STATUS"),
        Column::left("BLOCKED"),
        Column::right("FAILURES"),
    ]);
    for group in &groups {
        for entry in &group.entries {
            table.row(vec![
                group.rig.clone(),
                entry.work_bead_id.clone(),
                entry.status.clone(),
                if entry.blocked { "yes" } else { "no" }.to_string(),
                entry.dispatch_failures.to_string(),
            ]);
        }
    }
    table.render(&mut std::io::stdout());
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn run(
    town_root: &Path,
    bd: &dyn BdClient,
    sessions: &dyn SessionAdapter,
    launcher: &dyn town_adapters::LaunchHook,
    sql_server: Option<&dyn SqlServerAdapter>,
    batch: Option<u32>,
    dry_run: bool,
    format: OutputFormat,
) -> Result<()> {
    let opts = PassOptions {
        batch_override: batch,
        dry_run,
    };

    let outcome = town_dispatch::run_pass(town_root, bd, sessions, launcher, sql_server, opts).await?;

    if format == OutputFormat::Json {
        return print_json(&outcome);
    }

    if outcome.dispatched.is_empty() && outcome.failed == 0 {
        if !is_daemon_invocation() {
            println!("nothing dispatched ({})", outcome.reason);
        }
        return Ok(());
    }

    println!(
        "dispatched {}, failed {} ({})",
        outcome.dispatched.len(),
        outcome.failed,
        outcome.reason
    );
    Ok(())
}

fn pause(town_root: &Path) -> Result<()> {
    state_store::update(town_root, |s| s.pause(actor())).context("failed to persist paused state")?;
    println!("paused");
    Ok(())
}

fn resume(town_root: &Path) -> Result<()> {
    state_store::update(town_root, |s| s.resume()).context("failed to persist resumed state")?;
    println!("resumed");
    Ok(())
}

async fn clear(town_root: &Path, bd: &dyn BdClient, bead: Option<String>) -> Result<()> {
    let entries = bd.list_open_queue_entries(town_root).await?;
    let targets: Vec<_> = match &bead {
        Some(id) => entries.into_iter().filter(|e| e.id.as_str() == id.as_str()).collect(),
        None => entries,
    };

    if targets.is_empty() {
        if let Some(id) = bead {
            bail!("no open queue entry matching {id:?}");
        }
        println!("nothing to clear");
        return Ok(());
    }

    for entry in &targets {
        bd.close_queue_entry(town_root, &entry.id, CloseReason::Cleared).await?;
    }
    println!(
        "cleared {} queue entr{}",
        targets.len(),
        if targets.len() == 1 { "y" } else { "ies" }
    );
    Ok(())
}

async fn clean_orphans(town_root: &Path, bd: &dyn BdClient, sql_server: Option<&dyn SqlServerAdapter>) -> Result<()> {
    let rigs = town_dispatch::discover_rigs(town_root).context("failed to discover rigs")?;
    let report = town_dispatch::run_orphan_cleanup(bd, town_root, &rigs, sql_server).await?;

    if report.aborted_on_read_only {
        println!(
            "deleted {} orphaned queue entr{}, aborted early: sql server is read-only",
            report.deleted.len(),
            if report.deleted.len() == 1 { "y" } else { "ies" }
        );
    } else {
        println!(
            "deleted {} orphaned queue entr{}",
            report.deleted.len(),
            if report.deleted.len() == 1 { "y" } else { "ies" }
        );
    }
    Ok(())
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
