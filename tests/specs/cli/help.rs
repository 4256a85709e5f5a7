//! CLI help output specs.

use crate::prelude::*;

#[test]
fn town_help_shows_usage() {
    cli(&["--help"]).passes().stdout_has("Usage:");
}

#[test]
fn town_no_args_shows_usage_and_fails() {
    cli(&[]).fails().stderr_has("Usage:");
}

#[test]
fn town_scheduler_help_shows_subcommands() {
    cli(&["scheduler", "--help"])
        .passes()
        .stdout_has("status")
        .stdout_has("list")
        .stdout_has("run")
        .stdout_has("pause")
        .stdout_has("resume")
        .stdout_has("clear");
}

#[test]
fn town_scheduler_run_help_shows_flags() {
    cli(&["scheduler", "run", "--help"])
        .passes()
        .stdout_has("--batch")
        .stdout_has("--dry-run");
}

#[test]
fn town_version_shows_version() {
    cli(&["--version"]).passes().stdout_has("0.1");
}

#[test]
fn town_unknown_subcommand_fails() {
    cli(&["nonexistent"]).fails().stderr_has("error:");
}
