// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use town_adapters::FakeSqlServer;

#[tokio::test]
async fn healthy_server_needs_no_recovery() {
    let server = FakeSqlServer::new();
    let health = check_and_recover(&server).await.unwrap();
    assert_eq!(health, ServerHealth::Healthy);
    assert!(server.calls().iter().all(|c| matches!(c, town_adapters::SqlServerCall::ProbeWrite)));
}

#[tokio::test]
async fn read_only_server_triggers_restart() {
    let server = FakeSqlServer::new();
    server.set_health(ServerHealth::ReadOnly);

    let health = check_and_recover(&server).await.unwrap();
    assert_eq!(health, ServerHealth::ReadOnly);

    let calls = server.calls();
    assert!(calls.contains(&town_adapters::SqlServerCall::Stop));
    assert!(calls.contains(&town_adapters::SqlServerCall::Start));
}

#[test]
fn dispatch_allowed_only_when_healthy() {
    assert!(dispatch_allowed(ServerHealth::Healthy));
    assert!(!dispatch_allowed(ServerHealth::ReadOnly));
    assert!(!dispatch_allowed(ServerHealth::Stopped));
}

#[tokio::test(start_paused = true)]
async fn restart_past_timeout_surfaces_server_start_timeout() {
    let server = FakeSqlServer::new();
    server.set_health(ServerHealth::ReadOnly);
    server.set_restart_delay(RESTART_TIMEOUT + Duration::from_secs(1));

    let err = check_and_recover(&server).await.unwrap_err();
    assert!(matches!(
        err,
        DispatchError::Town(town_core::TownError::ServerStartTimeout)
    ));
}
