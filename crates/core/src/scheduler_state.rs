// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler State (§3): the process-wide persistent pause/resume document.

use serde::{Deserialize, Serialize};

/// Mutated only under the dispatch file-lock, and re-read immediately before
/// write to avoid clobbering concurrent pause/resume commands (§3, §5).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SchedulerState {
    pub paused: bool,
    pub paused_by: Option<String>,
    pub last_dispatch_at: Option<i64>,
    pub last_dispatch_count: u32,
}

impl SchedulerState {
    pub fn pause(&mut self, actor: impl Into<String>) {
        self.paused = true;
        self.paused_by = Some(actor.into());
    }

    pub fn resume(&mut self) {
        self.paused = false;
        self.paused_by = None;
    }

    pub fn record_dispatch(&mut self, at_epoch_ms: i64, count: u32) {
        self.last_dispatch_at = Some(at_epoch_ms);
        self.last_dispatch_count = count;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pause_records_actor() {
        let mut state = SchedulerState::default();
        state.pause("operator");
        assert!(state.paused);
        assert_eq!(state.paused_by.as_deref(), Some("operator"));
    }

    #[test]
    fn resume_clears_actor() {
        let mut state = SchedulerState::default();
        state.pause("operator");
        state.resume();
        assert!(!state.paused);
        assert_eq!(state.paused_by, None);
    }

    #[test]
    fn record_dispatch_updates_counters() {
        let mut state = SchedulerState::default();
        state.record_dispatch(1000, 2);
        assert_eq!(state.last_dispatch_at, Some(1000));
        assert_eq!(state.last_dispatch_count, 2);
    }
}
