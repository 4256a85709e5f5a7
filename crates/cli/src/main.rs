// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! town - capacity-controlled dispatch scheduler for a town of rigs

mod color;
mod commands;
mod output;
mod table;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::prelude::*;

use commands::scheduler::{self, SchedulerCommand};
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "town",
    version,
    about = "Capacity-controlled dispatch scheduler for a town of rigs"
)]
struct Cli {
    /// Town root directory (defaults to $TOWN_ROOT, then the current directory)
    #[arg(short = 'C', long = "town-root", global = true, value_name = "DIR")]
    town_root: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", value_enum, default_value_t, global = true)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Dispatch scheduler operations (§6)
    Scheduler {
        #[command(subcommand)]
        command: SchedulerCommand,
    },
}

/// Plain stderr logging at a terminal; a daily-rotating file under
/// `<town-root>/.runtime/logs/` when triggered by the heartbeat daemon
/// (`GT_DAEMON=1`), which has no terminal to write to. The returned guard
/// must be held for the program's lifetime — dropping it early truncates
/// buffered log lines.
fn init_tracing(town_root: &std::path::Path, daemon: bool) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter =
        tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if !daemon {
        tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
        return Ok(None);
    }

    let log_dir = town_root.join(".runtime").join("logs");
    std::fs::create_dir_all(&log_dir).context("failed to create log directory")?;
    let file_appender = tracing_appender::rolling::daily(log_dir, "scheduler.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(Some(guard))
}

fn resolve_town_root(flag: Option<PathBuf>) -> Result<PathBuf> {
    let raw = flag
        .or_else(|| std::env::var_os("TOWN_ROOT").map(PathBuf::from))
        .map_or_else(|| std::env::current_dir(), Ok)
        .context("failed to determine town root")?;

    raw.canonicalize()
        .with_context(|| format!("town root {} does not exist", raw.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let town_root = resolve_town_root(cli.town_root)?;

    let daemon = std::env::var("GT_DAEMON").as_deref() == Ok("1");
    let _tracing_guard = init_tracing(&town_root, daemon)?;

    let result = match cli.command {
        Commands::Scheduler { command } => scheduler::handle(command, &town_root, cli.output).await,
    };

    if let Err(e) = &result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }

    Ok(())
}
