// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared error taxonomy (§7), semantic kinds rather than transport-specific ones.

use thiserror::Error;

/// Errors that can arise while parsing a queue entry's payload (§4.1).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PayloadError {
    #[error("payload missing required field: {0}")]
    MissingField(&'static str),
    #[error("payload is not valid key/value encoding")]
    Malformed,
}

/// Town-wide errors surfaced to the CLI boundary. Kinds mirror §7's table;
/// `ReadinessAllFailed` is the only one that aborts a pass outright.
#[derive(Debug, Error)]
pub enum TownError {
    #[error("dispatch lock is held by another pass")]
    LockContended,
    #[error("all rig readiness queries failed: {0}")]
    ReadinessAllFailed(String),
    #[error("sql server is in read-only mode")]
    ReadOnlyServer,
    #[error("sql server did not become healthy before timeout")]
    ServerStartTimeout,
    #[error("{0}")]
    Other(String),
}
