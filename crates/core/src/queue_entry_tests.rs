// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn record_failure_increments_and_stores_message() {
    let mut payload = QueuePayload::new("w1", "r1", 100);
    payload.record_failure("boom");
    assert_eq!(payload.dispatch_failures, 1);
    assert_eq!(payload.last_failure, "boom");
}

#[test]
fn circuit_breaks_at_max_dispatch_failures() {
    let mut payload = QueuePayload::new("w1", "r1", 100);
    for _ in 0..MAX_DISPATCH_FAILURES - 1 {
        payload.record_failure("err");
        assert!(!payload.is_circuit_broken());
    }
    payload.record_failure("err");
    assert!(payload.is_circuit_broken());
}

#[test]
fn queue_entry_status_display() {
    assert_eq!(QueueEntryStatus::Open.to_string(), "open");
    assert_eq!(QueueEntryStatus::Closed.to_string(), "closed");
}

#[test]
fn close_reason_display_matches_spec_wire_strings() {
    assert_eq!(CloseReason::Dispatched.to_string(), "dispatched");
    assert_eq!(CloseReason::CircuitBroken.to_string(), "circuit-broken");
    assert_eq!(CloseReason::StaleWorkBead.to_string(), "stale-work-bead");
    assert_eq!(CloseReason::InvalidContext.to_string(), "invalid-context");
    assert_eq!(CloseReason::Cleared.to_string(), "cleared");
    assert_eq!(
        CloseReason::DispatchCloseFailed.to_string(),
        "dispatch-close-failed"
    );
}
