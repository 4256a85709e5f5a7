// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! town-adapters: adapters for the external I/O the dispatch engine touches —
//! tmux sessions (capacity probe, launcher), the shared SQL server, and the
//! subprocess plumbing both are built on.

pub mod launch;
pub mod session;
pub mod sql_server;
pub mod subprocess;

pub use launch::{LaunchError, LaunchHook, LaunchOutcome, TmuxLaunchHook};
pub use session::{NoOpSessionAdapter, SessionAdapter, SessionError, TmuxAdapter};
pub use sql_server::{ProcessSqlServerAdapter, ServerHealth, SqlServerAdapter, SqlServerError};

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
pub use launch::{FakeLaunchHook, LaunchCall};
#[cfg(any(test, feature = "test-support"))]
pub use session::{FakeSession, FakeSessionAdapter, SessionCall};
#[cfg(any(test, feature = "test-support"))]
pub use sql_server::{FakeSqlServer, SqlServerCall};
