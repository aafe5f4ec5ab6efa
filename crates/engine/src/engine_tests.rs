// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::sleeper::FakeSleeper;
use crate::status_reporter::StatusReporter;
use esm_adapters::{EngineType as AdapterEngineType, FakeDeployer};
use esm_core::{Action, EngineType, ManifestFile, ObservedStatus, StackId, StatusKind, Version};
use esm_storage::ManifestStore;
use esm_wire::{DesiredStackEntry, DesiredState, FakeControlPlaneClient, StackPayload};

fn sample_payload(id: StackId, version: Version) -> StackPayload {
    StackPayload {
        id,
        version,
        namespace: "default".to_string(),
        entry_file: "compose.yaml".to_string(),
        env: Default::default(),
        flags: Default::default(),
        registry_credentials: None,
        rollback_to: Default::default(),
        edge_update_id: Default::default(),
        files: vec![ManifestFile { relative_path: "compose.yaml".to_string(), contents: b"services: {}\n".to_vec() }],
    }
}

fn wire_up(control_plane: FakeControlPlaneClient, deployer: FakeDeployer) -> (Engine<FakeSleeper>, tempfile::TempDir) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let registry = Registry::new();
    let store = Arc::new(ManifestStore::new(tmp.path().join("manifests")));
    let control_plane: Arc<dyn esm_wire::ControlPlaneClient> = Arc::new(control_plane);
    let deployer: Arc<dyn esm_adapters::Deployer> = Arc::new(deployer);

    let reconciler = Reconciler::new(
        registry.clone(),
        deployer,
        store.clone(),
        StatusReporter::new(control_plane.clone()),
        tmp.path().join("host"),
        "compose",
    );
    let intake = Intake::new(
        registry.clone(),
        control_plane.clone(),
        store,
        StatusReporter::new(control_plane),
        EngineType::DockerStandalone,
    );
    let engine = Engine::new(registry, FakeSleeper::new(), reconciler, intake);
    (engine, tmp)
}

#[tokio::test]
async fn a_fresh_deploy_reaches_awaiting_deployed_status_through_the_worker_loop() {
    let control_plane = FakeControlPlaneClient::new();
    control_plane.set_config(sample_payload(StackId::new(42), Version::new(1)));
    let reports_client = control_plane.clone();
    let deployer = FakeDeployer::new(AdapterEngineType::DockerStandalone);

    let (engine, _tmp) = wire_up(control_plane, deployer);

    let mut desired = DesiredState::new();
    desired.insert(StackId::new(42), DesiredStackEntry { version: Version::new(1), ready_re_pull_image: false });
    engine.poll(desired).await.expect("poll succeeds");

    assert!(!engine.is_ready());

    // The worker loop sees Pending, runs one pass, then idles — spin it
    // until the record reaches its terminal-for-this-pass state.
    for _ in 0..10 {
        if let Some(record) = engine.registry().snapshot().into_iter().find(|r| r.id == StackId::new(42)) {
            if record.status == ObservedStatus::AwaitingDeployedStatus {
                break;
            }
        }
        let snapshot = engine.registry().snapshot();
        if let Some(record) = snapshot.into_iter().find(|r| r.status == ObservedStatus::Pending) {
            // Drive one reconciliation pass directly; exercising the
            // scheduler's sleep/no-sleep branches is covered in
            // `scheduler_tests`, not here.
            let _ = record;
        }
        break;
    }

    // Drive the worker loop itself for a bounded number of iterations.
    engine.stop();
    engine.run().await;

    let record = engine.registry().lookup(StackId::new(42)).expect("record tracked");
    assert_eq!(record.status, ObservedStatus::AwaitingDeployedStatus);
    assert_eq!(record.action, Action::Idle);

    let kinds: Vec<StatusKind> = reports_client.reports().into_iter().map(|r| r.kind).collect();
    assert_eq!(kinds, vec![StatusKind::Acknowledged, StatusKind::Deploying, StatusKind::DeploymentReceived]);
}

#[tokio::test]
async fn readiness_flips_after_the_first_scheduling_pass() {
    let control_plane = FakeControlPlaneClient::new();
    let deployer = FakeDeployer::new(AdapterEngineType::DockerStandalone);
    let (engine, _tmp) = wire_up(control_plane, deployer);

    assert!(!engine.is_ready());
    engine.stop();
    engine.run().await;
    assert!(engine.is_ready());
}

#[tokio::test]
async fn stop_halts_the_worker_loop_promptly() {
    let control_plane = FakeControlPlaneClient::new();
    let deployer = FakeDeployer::new(AdapterEngineType::DockerStandalone);
    let (engine, _tmp) = wire_up(control_plane, deployer);

    engine.stop();
    // Must return, not hang — bounded by the test harness's own timeout
    // if this assumption is ever broken.
    engine.run().await;
}
