// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session enumeration and spawning, used by the capacity probe (§4.3) and
//! by the tmux-backed launch hook (§4.7).

mod noop;
mod tmux;

pub use noop::NoOpSessionAdapter;
pub use tmux::TmuxAdapter;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeSession, FakeSessionAdapter, SessionCall};

use async_trait::async_trait;
use std::path::Path;
use thiserror::Error;

/// Errors from session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("session not found: {0}")]
    NotFound(String),
    #[error("spawn failed: {0}")]
    SpawnFailed(String),
    #[error("command failed: {0}")]
    CommandFailed(String),
}

/// Adapter for managing terminal-multiplexer sessions.
#[async_trait]
pub trait SessionAdapter: Send + Sync + 'static {
    /// Spawn a new session running `cmd`, returning its session id.
    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<String, SessionError>;

    /// Kill a session.
    async fn kill(&self, id: &str) -> Result<(), SessionError>;

    /// Check if a session is alive.
    async fn is_alive(&self, id: &str) -> Result<bool, SessionError>;

    /// List the names of all currently live sessions. Used by the capacity
    /// probe (§4.3) to count active polecats; advisory, may transiently
    /// over- or under-count.
    async fn list_sessions(&self) -> Result<Vec<String>, SessionError>;
}
