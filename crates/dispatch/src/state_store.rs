// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Scheduler State persistence (§3, §5): reads are free; writes reload then
//! write under the dispatch lock to avoid clobbering concurrent
//! pause/resume commands.

use std::path::{Path, PathBuf};

use town_core::SchedulerState;

const STATE_RELATIVE_PATH: &str = ".runtime/scheduler-state.json";

fn state_path(town_root: &Path) -> PathBuf {
    town_root.join(STATE_RELATIVE_PATH)
}

/// Load the scheduler state document, or the default (`paused = false`) if
/// absent or unparsable.
pub fn load(town_root: &Path) -> SchedulerState {
    let path = state_path(town_root);
    match std::fs::read_to_string(&path) {
        Ok(contents) => serde_json::from_str(&contents).unwrap_or_default(),
        Err(_) => SchedulerState::default(),
    }
}

/// Overwrite the scheduler state document. Callers must hold the dispatch
/// lock (or, for pause/resume outside a pass, must themselves serialize
/// writes) before calling this.
pub fn save(town_root: &Path, state: &SchedulerState) -> std::io::Result<()> {
    let path = state_path(town_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(state)
        .unwrap_or_else(|_| "{}".to_string());
    std::fs::write(path, json)
}

/// Reload the document, apply `mutate`, then write it back. This is the
/// reload-then-write pattern that keeps a concurrent `pause`/`resume` from
/// being clobbered by a dispatch pass that read the state before the
/// command landed.
pub fn update(town_root: &Path, mutate: impl FnOnce(&mut SchedulerState)) -> std::io::Result<SchedulerState> {
    let mut state = load(town_root);
    mutate(&mut state);
    save(town_root, &state)?;
    Ok(state)
}

#[cfg(test)]
#[path = "state_store_tests.rs"]
mod tests;
