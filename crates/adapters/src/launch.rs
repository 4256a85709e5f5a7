// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launch hook (§4.7): spawns the polecat session for a selected queue
//! entry. Wraps a `SessionAdapter` the way `traced.rs` used to wrap agent
//! and session adapters with tracing, minus the tracing wrapper itself —
//! the launcher emits its own telemetry events at the dispatch-engine layer.

use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

use crate::session::{SessionAdapter, SessionError};

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("launch failed: {0}")]
    Failed(String),
}

impl From<SessionError> for LaunchError {
    fn from(err: SessionError) -> Self {
        LaunchError::Failed(err.to_string())
    }
}

/// Outcome of a successful launch, including the polecat name when the hook
/// reports one (§4.7: "possibly including the launched polecat name").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchOutcome {
    pub polecat_name: Option<String>,
}

/// Opaque per-entry launch hook. `launch_params` is the JSON reconstructed
/// from the queue entry's payload.
#[async_trait]
pub trait LaunchHook: Send + Sync + 'static {
    async fn launch(&self, name: &str, cwd: &PathBuf, launch_params: &Value) -> Result<LaunchOutcome, LaunchError>;
}

/// Launch hook backed by a tmux-style `SessionAdapter`. `launch_params` is
/// expected to carry a `command` string; everything else in the object is
/// passed through as session environment (`KEY=value` pairs of string
/// fields), mirroring the way queue payload fields flow into the subprocess
/// environment in `town_bd::subprocess`.
pub struct TmuxLaunchHook<A> {
    adapter: A,
}

impl<A: SessionAdapter> TmuxLaunchHook<A> {
    pub fn new(adapter: A) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl<A: SessionAdapter> LaunchHook for TmuxLaunchHook<A> {
    async fn launch(&self, name: &str, cwd: &PathBuf, launch_params: &Value) -> Result<LaunchOutcome, LaunchError> {
        let cmd = launch_params
            .get("command")
            .and_then(Value::as_str)
            .ok_or_else(|| LaunchError::Failed("launch_params missing command".to_string()))?;

        let env: Vec<(String, String)> = launch_params
            .as_object()
            .map(|obj| {
                obj.iter()
                    .filter(|(k, _)| k.as_str() != "command")
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let session_id = self.adapter.spawn(name, cwd, cmd, &env).await?;
        Ok(LaunchOutcome {
            polecat_name: Some(session_id),
        })
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Debug, Clone)]
    pub struct LaunchCall {
        pub name: String,
        pub cwd: PathBuf,
        pub launch_params: Value,
    }

    #[derive(Default)]
    struct FakeState {
        calls: Vec<LaunchCall>,
        should_fail: bool,
    }

    /// Records launch calls and returns a canned outcome, for dispatch-engine
    /// tests that don't want a real tmux dependency.
    #[derive(Clone, Default)]
    pub struct FakeLaunchHook {
        inner: Arc<Mutex<FakeState>>,
    }

    impl FakeLaunchHook {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_should_fail(&self, should_fail: bool) {
            self.inner.lock().should_fail = should_fail;
        }

        pub fn calls(&self) -> Vec<LaunchCall> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl LaunchHook for FakeLaunchHook {
        async fn launch(&self, name: &str, cwd: &PathBuf, launch_params: &Value) -> Result<LaunchOutcome, LaunchError> {
            let mut inner = self.inner.lock();
            inner.calls.push(LaunchCall {
                name: name.to_string(),
                cwd: cwd.clone(),
                launch_params: launch_params.clone(),
            });
            if inner.should_fail {
                return Err(LaunchError::Failed("fake launch failure".to_string()));
            }
            Ok(LaunchOutcome {
                polecat_name: Some(format!("fake-{}", name)),
            })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeLaunchHook, LaunchCall};

#[cfg(test)]
#[path = "launch_tests.rs"]
mod tests;
