// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tempfile::tempdir;

#[test]
fn acquires_lock_when_free() {
    let town = tempdir().unwrap();
    let lock = try_acquire(town.path()).unwrap();
    assert!(lock.is_some());
}

#[test]
fn second_acquire_while_held_returns_none() {
    let town = tempdir().unwrap();
    let first = try_acquire(town.path()).unwrap();
    assert!(first.is_some());

    let second = try_acquire(town.path()).unwrap();
    assert!(second.is_none());
}

#[test]
fn lock_is_released_on_drop() {
    let town = tempdir().unwrap();
    {
        let _first = try_acquire(town.path()).unwrap();
    }
    let second = try_acquire(town.path()).unwrap();
    assert!(second.is_some());
}
