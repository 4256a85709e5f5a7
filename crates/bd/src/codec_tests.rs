// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn round_trips_a_full_payload() {
    let mut payload = QueuePayload::new("w1", "rig-a", 100);
    payload.record_failure("oops");
    payload.launch_params = serde_json::json!({"formula": "build", "args": ["--release"]});
    let encoded = encode(&payload);
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded, payload);
}

#[test]
fn tolerates_unknown_keys_for_forward_compatibility() {
    let blob = "version=1\nwork_bead_id=w1\ntarget_rig=rig-a\nenqueued_at=5\nfrobnicate_hint=yes\n";
    let decoded = decode(blob).unwrap();
    assert_eq!(decoded.work_bead_id, "w1");
    assert_eq!(decoded.extra.get("frobnicate_hint"), Some(&"yes".to_string()));
}

#[test]
fn re_encoding_preserves_unknown_keys() {
    let blob = "version=1\nwork_bead_id=w1\ntarget_rig=rig-a\nenqueued_at=5\nfuture_field=z\n";
    let decoded = decode(blob).unwrap();
    let re_encoded = encode(&decoded);
    assert!(re_encoded.contains("future_field=z"));
}

#[test]
fn missing_work_bead_id_is_rejected() {
    let blob = "version=1\ntarget_rig=rig-a\n";
    let err = decode(blob).unwrap_err();
    assert_eq!(err, PayloadError::MissingField("work_bead_id"));
}

#[test]
fn missing_target_rig_is_rejected() {
    let blob = "version=1\nwork_bead_id=w1\n";
    let err = decode(blob).unwrap_err();
    assert_eq!(err, PayloadError::MissingField("target_rig"));
}

#[test]
fn empty_blob_is_rejected() {
    let err = decode("").unwrap_err();
    assert_eq!(err, PayloadError::MissingField("work_bead_id"));
}

#[test]
fn last_failure_with_embedded_newline_round_trips() {
    let mut payload = QueuePayload::new("w1", "rig-a", 1);
    payload.record_failure("line one\nline two");
    let encoded = encode(&payload);
    let decoded = decode(&encoded).unwrap();
    assert_eq!(decoded.last_failure, "line one\nline two");
}
