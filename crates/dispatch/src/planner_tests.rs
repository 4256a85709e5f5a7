// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use town_core::{QueueEntryId, QueueEntryStatus, QueuePayload};

fn entry(id: &str, work_bead_id: &str, enqueued_at: i64) -> QueueEntry {
    QueueEntry {
        id: QueueEntryId::new(id),
        title: "work".into(),
        status: QueueEntryStatus::Open,
        payload: QueuePayload::new(work_bead_id, "rig-a", enqueued_at),
        created_at: enqueued_at,
        updated_at: enqueued_at,
    }
}

#[test]
fn dedup_keeps_earliest_enqueued_duplicate() {
    let entries = vec![entry("qe-1", "w1", 200), entry("qe-2", "w1", 100)];
    let deduped = dedup_by_work_bead(entries);
    assert_eq!(deduped.len(), 1);
    assert_eq!(deduped[0].id.as_str(), "qe-2");
}

#[test]
fn dedup_sorts_by_enqueued_at() {
    let entries = vec![entry("qe-1", "w1", 200), entry("qe-2", "w2", 100)];
    let deduped = dedup_by_work_bead(entries);
    assert_eq!(deduped[0].payload.work_bead_id, "w2");
    assert_eq!(deduped[1].payload.work_bead_id, "w1");
}

#[test]
fn plan_no_capacity_returns_empty_with_reason() {
    let ready = vec![entry("qe-1", "w1", 1)];
    let plan_result = plan(0, &ready, 10);
    assert!(plan_result.to_dispatch.is_empty());
    assert_eq!(plan_result.reason, "no-capacity");
}

#[test]
fn plan_empty_ready_list_returns_none_reason() {
    let plan_result = plan(5, &[], 10);
    assert!(plan_result.to_dispatch.is_empty());
    assert_eq!(plan_result.reason, "none");
}

#[test]
fn plan_selects_min_of_capacity_batch_and_ready_len() {
    let ready = vec![entry("qe-1", "w1", 1), entry("qe-2", "w2", 2), entry("qe-3", "w3", 3)];

    let plan_result = plan(2, &ready, 10);
    assert_eq!(plan_result.to_dispatch.len(), 2);
    assert_eq!(plan_result.skipped, 1);

    let plan_result = plan(10, &ready, 1);
    assert_eq!(plan_result.to_dispatch.len(), 1);
    assert_eq!(plan_result.skipped, 2);
}

#[test]
fn plan_dispatches_in_fifo_order() {
    let ready = vec![entry("qe-1", "w1", 1), entry("qe-2", "w2", 2)];
    let plan_result = plan(5, &ready, 10);
    assert_eq!(plan_result.to_dispatch[0].id.as_str(), "qe-1");
    assert_eq!(plan_result.to_dispatch[1].id.as_str(), "qe-2");
}

proptest::proptest! {
    /// Whatever the input order, dedup leaves at most one entry per work
    /// bead and sorts survivors by `enqueued_at` (§3 invariant 2, §5).
    #[test]
    fn dedup_is_sorted_and_unique_per_work_bead(
        raw in proptest::collection::vec((0..4i64, 0..1000i64), 0..20)
    ) {
        let entries: Vec<QueueEntry> = raw
            .iter()
            .enumerate()
            .map(|(i, (bead, ts))| entry(&format!("qe-{i}"), &format!("w{bead}"), *ts))
            .collect();

        let deduped = dedup_by_work_bead(entries);

        let mut seen = std::collections::HashSet::new();
        for e in &deduped {
            proptest::prop_assert!(seen.insert(e.payload.work_bead_id.clone()));
        }
        proptest::prop_assert!(deduped.windows(2).all(|w| w[0].payload.enqueued_at <= w[1].payload.enqueued_at));
    }

    /// The plan never dispatches more than `min(capacity, batch_size,
    /// ready.len())` entries, and whatever it does dispatch is the front of
    /// `ready` in order (§4.6 FIFO tie-break).
    #[test]
    fn plan_never_exceeds_bounds_and_preserves_prefix_order(
        capacity in 0i64..10,
        batch_size in 0u32..10,
        len in 0usize..15,
    ) {
        let ready: Vec<QueueEntry> = (0..len)
            .map(|i| entry(&format!("qe-{i}"), &format!("w{i}"), i as i64))
            .collect();

        let plan_result = plan(capacity, &ready, batch_size);

        let expected = (capacity.max(0) as usize).min(batch_size as usize).min(ready.len());
        proptest::prop_assert_eq!(plan_result.to_dispatch.len(), expected);
        for (i, dispatched) in plan_result.to_dispatch.iter().enumerate() {
            proptest::prop_assert_eq!(dispatched.id.as_str(), ready[i].id.as_str());
        }
    }
}
