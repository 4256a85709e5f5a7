// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch-pass mutual exclusivity (§5): a non-blocking exclusive file
//! lock on `<town-root>/.runtime/scheduler-dispatch.lock`. Concurrent
//! invocations immediately return rather than queue.

use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;

const LOCK_RELATIVE_PATH: &str = ".runtime/scheduler-dispatch.lock";

/// Held for the duration of one dispatch pass; dropping it releases the
/// underlying OS lock.
pub struct DispatchLock {
    _file: File,
}

fn lock_path(town_root: &Path) -> PathBuf {
    town_root.join(LOCK_RELATIVE_PATH)
}

/// Attempt to acquire the dispatch lock. Returns `Ok(None)` (not an error)
/// when another pass already holds it — callers treat this as "return, 0
/// dispatched" (§7, `LockContended`).
pub fn try_acquire(town_root: &Path) -> std::io::Result<Option<DispatchLock>> {
    let path = lock_path(town_root);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).write(true).open(&path)?;
    match file.try_lock_exclusive() {
        Ok(()) => Ok(Some(DispatchLock { _file: file })),
        Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => Ok(None),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
