// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake session adapter for testing

use super::{SessionAdapter, SessionError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Recorded session call
#[derive(Debug, Clone)]
pub enum SessionCall {
    Spawn {
        name: String,
        cwd: PathBuf,
        cmd: String,
        env: Vec<(String, String)>,
    },
    Kill {
        id: String,
    },
    IsAlive {
        id: String,
    },
    ListSessions,
}

/// Fake session state
#[derive(Debug, Clone)]
pub struct FakeSession {
    pub name: String,
    pub cwd: PathBuf,
    pub cmd: String,
    pub env: Vec<(String, String)>,
    pub alive: bool,
}

struct FakeSessionState {
    sessions: HashMap<String, FakeSession>,
    calls: Vec<SessionCall>,
    next_id: u64,
}

/// Fake session adapter for testing
#[derive(Clone)]
pub struct FakeSessionAdapter {
    inner: Arc<Mutex<FakeSessionState>>,
}

impl Default for FakeSessionAdapter {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(FakeSessionState {
                sessions: HashMap::new(),
                calls: Vec::new(),
                next_id: 0,
            })),
        }
    }
}

impl FakeSessionAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<SessionCall> {
        self.inner.lock().calls.clone()
    }

    /// Get a session by ID
    pub fn get_session(&self, id: &str) -> Option<FakeSession> {
        self.inner.lock().sessions.get(id).cloned()
    }

    /// Mark session as exited
    pub fn set_exited(&self, id: &str) {
        if let Some(session) = self.inner.lock().sessions.get_mut(id) {
            session.alive = false;
        }
    }

    /// Add a pre-existing session by ID (for testing liveness/list checks)
    pub fn add_session(&self, id: &str, alive: bool) {
        self.inner.lock().sessions.insert(
            id.to_string(),
            FakeSession {
                name: id.to_string(),
                cwd: PathBuf::new(),
                cmd: String::new(),
                env: Vec::new(),
                alive,
            },
        );
    }
}

#[async_trait]
impl SessionAdapter for FakeSessionAdapter {
    async fn spawn(
        &self,
        name: &str,
        cwd: &Path,
        cmd: &str,
        env: &[(String, String)],
    ) -> Result<String, SessionError> {
        let mut inner = self.inner.lock();

        inner.next_id += 1;
        let id = format!("fake-{}", inner.next_id);

        inner.calls.push(SessionCall::Spawn {
            name: name.to_string(),
            cwd: cwd.to_path_buf(),
            cmd: cmd.to_string(),
            env: env.to_vec(),
        });

        let session = FakeSession {
            name: name.to_string(),
            cwd: cwd.to_path_buf(),
            cmd: cmd.to_string(),
            env: env.to_vec(),
            alive: true,
        };

        inner.sessions.insert(id.clone(), session);

        Ok(id)
    }

    async fn kill(&self, id: &str) -> Result<(), SessionError> {
        let mut inner = self.inner.lock();

        inner.calls.push(SessionCall::Kill { id: id.to_string() });

        if let Some(session) = inner.sessions.get_mut(id) {
            session.alive = false;
        }

        Ok(())
    }

    async fn is_alive(&self, id: &str) -> Result<bool, SessionError> {
        let mut inner = self.inner.lock();

        inner.calls.push(SessionCall::IsAlive { id: id.to_string() });

        match inner.sessions.get(id) {
            Some(session) => Ok(session.alive),
            None => Ok(false),
        }
    }

    async fn list_sessions(&self) -> Result<Vec<String>, SessionError> {
        let mut inner = self.inner.lock();
        inner.calls.push(SessionCall::ListSessions);
        Ok(inner
            .sessions
            .iter()
            .filter(|(_, s)| s.alive)
            .map(|(id, _)| id.clone())
            .collect())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
