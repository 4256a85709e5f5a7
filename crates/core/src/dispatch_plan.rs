// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The output of the pure dispatch planner (§4.6).

use crate::queue_entry::QueueEntry;
use serde::{Deserialize, Serialize};

/// Result of planning one dispatch pass. Produced by a pure function with
/// no side effects; never touches storage or the launch hook itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchPlan {
    pub to_dispatch: Vec<QueueEntry>,
    pub skipped: usize,
    pub reason: String,
}

impl DispatchPlan {
    pub fn empty(reason: impl Into<String>) -> Self {
        Self {
            to_dispatch: Vec::new(),
            skipped: 0,
            reason: reason.into(),
        }
    }
}
