// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use town_core::QueueEntryId;

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

#[tokio::test]
async fn list_open_queue_entries_only_returns_open() {
    let bd = FakeBdClient::new();
    bd.seed_entry(entry("qe-1", "w1", 1));
    let mut closed = entry("qe-2", "w2", 2);
    closed.status = QueueEntryStatus::Closed;
    bd.seed_entry(closed);

    let open = bd.list_open_queue_entries(Path::new("/town")).await.unwrap();
    assert_eq!(open.len(), 1);
    assert_eq!(open[0].id.as_str(), "qe-1");
}

#[tokio::test]
async fn close_queue_entry_marks_closed() {
    let bd = FakeBdClient::new();
    bd.seed_entry(entry("qe-1", "w1", 1));
    bd.close_queue_entry(Path::new("/town"), &QueueEntryId::new("qe-1"), CloseReason::Dispatched)
        .await
        .unwrap();
    assert_eq!(bd.get_entry("qe-1").unwrap().status, QueueEntryStatus::Closed);
}

#[tokio::test]
async fn close_missing_entry_errors() {
    let bd = FakeBdClient::new();
    let result = bd
        .close_queue_entry(Path::new("/town"), &QueueEntryId::new("missing"), CloseReason::Cleared)
        .await;
    assert!(matches!(result, Err(BdError::NotFound(_))));
}

#[tokio::test]
async fn read_only_mode_rejects_mutations_but_not_reads() {
    let bd = FakeBdClient::new();
    bd.seed_entry(entry("qe-1", "w1", 1));
    bd.set_read_only(true);

    assert!(bd.list_open_queue_entries(Path::new("/town")).await.is_ok());
    let result = bd
        .close_queue_entry(Path::new("/town"), &QueueEntryId::new("qe-1"), CloseReason::Dispatched)
        .await;
    assert!(matches!(result, Err(BdError::ReadOnly)));
}

#[tokio::test]
async fn failing_dir_surfaces_per_rig_error() {
    let bd = FakeBdClient::new();
    bd.fail_dir("/rigs/a");
    let result = bd.ready_work_beads(Path::new("/rigs/a")).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let bd = FakeBdClient::new();
    let _ = bd.ready_work_beads(Path::new("/rigs/a")).await;
    let _ = bd.list_open_queue_entries(Path::new("/town")).await;
    let calls = bd.calls();
    assert_eq!(calls.len(), 2);
    assert!(matches!(calls[0], BdCall::ReadyWorkBeads { .. }));
    assert!(matches!(calls[1], BdCall::ListOpenQueueEntries));
}
