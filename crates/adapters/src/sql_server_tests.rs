// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn fake_sql_server_defaults_healthy() {
    let server = FakeSqlServer::new();
    assert_eq!(server.probe_write().await.unwrap(), ServerHealth::Healthy);
}

#[tokio::test]
async fn fake_sql_server_restart_cycles_through_calls() {
    let server = FakeSqlServer::new();
    server.set_health(ServerHealth::ReadOnly);
    let health = server.restart().await.unwrap();

    assert_eq!(health, ServerHealth::ReadOnly);
    assert_eq!(
        server.calls(),
        vec![SqlServerCall::Stop, SqlServerCall::Start, SqlServerCall::ProbeWrite]
    );
}

#[test]
fn looks_read_only_matches_common_phrasing() {
    assert!(looks_read_only("ERROR: database is read-only"));
    assert!(looks_read_only("error: read only transaction"));
    assert!(!looks_read_only("connection refused"));
}
