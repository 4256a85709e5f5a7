//! `scheduler status` / `scheduler list` / `scheduler clear` specs, driven
//! against a fake `bd` binary standing in for the real subprocess contract
//! (§6).

use crate::prelude::*;

const EMPTY_QUEUE: &str = "[]";

fn one_open_entry() -> String {
    // description is the codec's key=value wire format (§4.1); \n here are
    // literal backslash-n escapes inside the JSON string, decoded back into
    // real newlines by serde_json before the codec splits on lines.
    r#"[{"id":"q-1","title":"bead-1","status":"open","description":"version=1\nwork_bead_id=bead-1\ntarget_rig=rig-a\nenqueued_at=100\ndispatch_failures=0\nlast_failure=\nlaunch_params=null","created_at":100,"updated_at":100}]"#
        .to_string()
}

#[test]
fn status_on_an_empty_town_reports_zero_queue() {
    let mut town = Town::empty();
    town.bd_stub(EMPTY_QUEUE);
    town.settings(4, 10);

    town.run(&["scheduler", "status"])
        .passes()
        .stdout_has("queued: 0 (0 ready)")
        .stdout_has("polecats: 0/4")
        .stdout_has("last dispatch: never");
}

#[test]
fn status_json_reports_the_same_snapshot() {
    let mut town = Town::empty();
    town.bd_stub(EMPTY_QUEUE);
    town.settings(4, 10);

    town.run(&["-o", "json", "scheduler", "status"])
        .passes()
        .stdout_has("\"queued_total\": 0")
        .stdout_has("\"max_polecats\": 4");
}

#[test]
fn list_on_an_empty_queue_says_so() {
    let mut town = Town::empty();
    town.bd_stub(EMPTY_QUEUE);

    town.run(&["scheduler", "list"]).passes().stdout_has("queue is empty");
}

#[test]
fn list_reports_a_blocked_open_entry() {
    let mut town = Town::empty();
    town.rig("rig-a");
    town.bd_stub(&one_open_entry());

    // No rig exposes the bead as ready (the stub's fallback `ready` branch
    // returns `[]`), so the entry is open but blocked.
    town.run(&["scheduler", "list"])
        .passes()
        .stdout_has("rig-a")
        .stdout_has("bead-1")
        .stdout_has("yes");
}

#[test]
fn list_json_includes_the_blocked_flag() {
    let mut town = Town::empty();
    town.rig("rig-a");
    town.bd_stub(&one_open_entry());

    town.run(&["-o", "json", "scheduler", "list"])
        .passes()
        .stdout_has("\"blocked\": true")
        .stdout_has("\"work_bead_id\": \"bead-1\"");
}

#[test]
fn clear_with_unknown_bead_id_fails() {
    let mut town = Town::empty();
    town.bd_stub(EMPTY_QUEUE);

    town.run(&["scheduler", "clear", "--bead", "nonexistent"])
        .fails()
        .stderr_has("no open queue entry");
}

#[test]
fn clear_all_on_an_empty_queue_is_a_no_op() {
    let mut town = Town::empty();
    town.bd_stub(EMPTY_QUEUE);

    town.run(&["scheduler", "clear"]).passes().stdout_has("nothing to clear");
}
