// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Versioned key/value encoding of [`QueuePayload`] into a bead's free-form
//! description field (§4.1).
//!
//! The wire format is one `key=value` pair per line, preceded by a
//! `version=1` header line. Unknown keys are preserved verbatim so a future
//! field can be added without breaking older readers (forward
//! compatibility, §4.1). Decoding fails only when `work_bead_id` or
//! `target_rig` is absent; every other field has a default.

use std::collections::BTreeMap;
use town_core::error::PayloadError;
use town_core::QueuePayload;

const VERSION_LINE: &str = "version=1";

/// Encode a payload into the description-field wire format.
pub fn encode(payload: &QueuePayload) -> String {
    let mut lines = vec![VERSION_LINE.to_string()];
    lines.push(format!("work_bead_id={}", payload.work_bead_id));
    lines.push(format!("target_rig={}", payload.target_rig));
    lines.push(format!("enqueued_at={}", payload.enqueued_at));
    lines.push(format!("dispatch_failures={}", payload.dispatch_failures));
    lines.push(format!("last_failure={}", escape(&payload.last_failure)));
    let launch_params = serde_json::to_string(&payload.launch_params).unwrap_or_default();
    lines.push(format!("launch_params={}", launch_params));
    for (key, value) in &payload.extra {
        lines.push(format!("{key}={value}"));
    }
    lines.join("\n")
}

/// Decode a description-field blob back into a [`QueuePayload`].
///
/// Returns [`PayloadError::MissingField`] when `work_bead_id` or
/// `target_rig` is absent — the reconciler closes such entries with
/// reason `invalid-context` (§4.5 rule 1).
pub fn decode(blob: &str) -> Result<QueuePayload, PayloadError> {
    let mut fields: BTreeMap<String, String> = BTreeMap::new();
    for line in blob.lines() {
        let line = line.trim();
        if line.is_empty() || line == VERSION_LINE {
            continue;
        }
        let Some((key, value)) = line.split_once('=') else {
            return Err(PayloadError::Malformed);
        };
        fields.insert(key.to_string(), unescape(value));
    }

    let work_bead_id = fields
        .remove("work_bead_id")
        .filter(|s| !s.is_empty())
        .ok_or(PayloadError::MissingField("work_bead_id"))?;
    let target_rig = fields
        .remove("target_rig")
        .filter(|s| !s.is_empty())
        .ok_or(PayloadError::MissingField("target_rig"))?;
    let enqueued_at = fields
        .remove("enqueued_at")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let dispatch_failures = fields
        .remove("dispatch_failures")
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    let last_failure = fields.remove("last_failure").unwrap_or_default();
    let launch_params = fields
        .remove("launch_params")
        .and_then(|s| serde_json::from_str(&s).ok())
        .unwrap_or(serde_json::Value::Null);

    Ok(QueuePayload {
        work_bead_id,
        target_rig,
        enqueued_at,
        dispatch_failures,
        last_failure,
        launch_params,
        extra: fields,
    })
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('\n', "\\n")
}

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('\\') => out.push('\\'),
                Some(other) => {
                    out.push('\\');
                    out.push(other);
                }
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;
