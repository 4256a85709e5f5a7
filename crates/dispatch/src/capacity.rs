// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Capacity Probe (§4.3): available dispatch slots derived from live tmux
//! sessions, never from an in-memory counter.

use town_adapters::{SessionAdapter, SessionError};

/// Sessions launched for a polecat are named `town-polecat-<rig>-<suffix>`
/// by the tmux adapter (`town-` is the adapter's own session-id prefix;
/// `polecat-` identifies the purpose to this probe).
const POLECAT_SESSION_PREFIX: &str = "town-polecat-";

/// True if `session_name` parses as a polecat session.
pub fn is_polecat_session(session_name: &str) -> bool {
    session_name.starts_with(POLECAT_SESSION_PREFIX)
}

/// Count live polecat sessions among an already-enumerated session list.
pub fn count_active_polecats(session_names: &[String]) -> usize {
    session_names.iter().filter(|n| is_polecat_session(n)).count()
}

/// `available = max_polecats - active_polecats`, floored at zero (§4.3).
/// Advisory: may transiently over- or under-count; callers must not rely on
/// it for at-most-once guarantees (those come from queue-entry closure).
pub async fn available_capacity(
    sessions: &dyn SessionAdapter,
    max_polecats: i64,
) -> Result<i64, SessionError> {
    let live = sessions.list_sessions().await?;
    let active = count_active_polecats(&live) as i64;
    Ok((max_polecats - active).max(0))
}

#[cfg(test)]
#[path = "capacity_tests.rs"]
mod tests;
