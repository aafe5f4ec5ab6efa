// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn ctx() -> DeployContext {
    DeployContext::default()
}

#[tokio::test]
async fn unscripted_calls_default_to_success() {
    let deployer = FakeDeployer::new(EngineType::DockerStandalone);
    assert!(deployer.validate("s1", &[], &ctx()).await.is_ok());
    assert!(deployer.pull("s1", &[], &ctx()).await.is_ok());
    assert!(deployer.deploy("s1", &[], &ctx()).await.is_ok());
    assert!(deployer.remove("s1", &[], &ctx()).await.is_ok());
}

#[tokio::test]
async fn queued_failure_is_consumed_once() {
    let deployer = FakeDeployer::new(EngineType::DockerSwarm);
    deployer.queue_pull(Err("network blip".into()));

    let first = deployer.pull("s1", &[], &ctx()).await;
    assert!(first.is_err());

    let second = deployer.pull("s1", &[], &ctx()).await;
    assert!(second.is_ok());
}

#[tokio::test]
async fn calls_are_recorded_in_order() {
    let deployer = FakeDeployer::new(EngineType::Kubernetes);
    deployer.validate("s1", &[], &ctx()).await.unwrap();
    deployer.deploy("s1", &[], &ctx()).await.unwrap();

    let calls = deployer.calls();
    assert_eq!(calls, vec![FakeCall::Validate("s1".into()), FakeCall::Deploy("s1".into())]);
}

#[tokio::test]
async fn unscripted_wait_defaults_to_unknown() {
    let deployer = FakeDeployer::new(EngineType::Nomad);
    let outcome = deployer.wait_for_status("s1", DeployerStatus::Running, Duration::from_secs(1)).await.unwrap();
    assert_eq!(outcome.status, DeployerStatus::Unknown);
}

#[tokio::test]
async fn queued_wait_outcome_is_returned() {
    let deployer = FakeDeployer::new(EngineType::DockerStandalone);
    deployer.queue_wait(WaitOutcome::ok(DeployerStatus::Running));
    let outcome = deployer.wait_for_status("s1", DeployerStatus::Running, Duration::from_secs(1)).await.unwrap();
    assert_eq!(outcome.status, DeployerStatus::Running);
}
