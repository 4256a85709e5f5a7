// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dispatch-engine error taxonomy (§7), wrapping the lower layers'.

use thiserror::Error;
use town_adapters::{LaunchError, SessionError, SqlServerError};
use town_bd::BdError;
use town_core::TownError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Town(#[from] TownError),
    #[error(transparent)]
    Bd(#[from] BdError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Launch(#[from] LaunchError),
    #[error(transparent)]
    SqlServer(#[from] SqlServerError),
    #[error("workspace discovery failed: {0}")]
    Workspace(#[source] std::io::Error),
    #[error("dispatch lock io error: {0}")]
    Lock(#[source] std::io::Error),
}
