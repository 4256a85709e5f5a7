//! `scheduler pause` / `scheduler resume` specs — pure state-document
//! mutation, no `bd` subprocess involved.

use crate::prelude::*;

#[test]
fn pause_then_resume_round_trips() {
    let town = Town::empty();

    town.run(&["scheduler", "pause"]).passes().stdout_eq("paused\n");
    town.run(&["scheduler", "resume"]).passes().stdout_eq("resumed\n");
}

#[test]
fn pause_is_idempotent() {
    let town = Town::empty();

    town.run(&["scheduler", "pause"]).passes();
    town.run(&["scheduler", "pause"]).passes().stdout_has("paused");
}

#[test]
fn resume_without_prior_pause_succeeds() {
    let town = Town::empty();

    town.run(&["scheduler", "resume"]).passes().stdout_has("resumed");
}
