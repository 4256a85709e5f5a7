// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Town Settings (§3): read-only concurrency configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Read-only configuration controlling dispatch concurrency.
///
/// Loaded from `<town-root>/.town/settings.toml`. A missing or unparsable
/// file falls back to [`TownSettings::default`], which disables dispatch
/// (§7, `SettingsMissing`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TownSettings {
    /// Concurrency cap. `<= 0` disables deferred dispatch.
    pub max_polecats: i64,
    /// Max launches per pass.
    pub batch_size: u32,
    /// Minimum interval (ms) between successive launches in a pass.
    pub spawn_delay_ms: u64,
}

impl Default for TownSettings {
    fn default() -> Self {
        Self {
            max_polecats: 0,
            batch_size: 10,
            spawn_delay_ms: 250,
        }
    }
}

impl TownSettings {
    pub fn spawn_delay(&self) -> Duration {
        Duration::from_millis(self.spawn_delay_ms)
    }

    pub fn dispatch_disabled(&self) -> bool {
        self.max_polecats <= 0
    }

    /// Load settings from `<town_root>/.town/settings.toml`, falling back to
    /// defaults (dispatch disabled) on any I/O or parse error.
    pub fn load_or_default(town_root: &Path) -> Self {
        let path = town_root.join(".town").join("settings.toml");
        match std::fs::read_to_string(&path) {
            Ok(contents) => match toml::from_str(&contents) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "settings unparsable, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                tracing::debug!(path = %path.display(), "no settings file, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
