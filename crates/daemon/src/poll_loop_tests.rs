use super::*;
use esm_core::{EngineType, Registry, StackId, Version};
use esm_engine::{Engine, Intake, Reconciler, StatusReporter, TokioSleeper};
use esm_wire::{ControlPlaneClient, DesiredStackEntry, FakeControlPlaneClient, StackPayload};
use esm_storage::ManifestStore;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

fn sample_payload(id: StackId) -> StackPayload {
    StackPayload {
        id,
        version: Version::new(1),
        namespace: "default".to_string(),
        entry_file: "compose.yaml".to_string(),
        env: BTreeMap::new(),
        flags: esm_core::StackFlags::default(),
        registry_credentials: None,
        rollback_to: esm_core::RollbackTag::default(),
        edge_update_id: esm_core::EdgeUpdateId::default(),
        files: vec![esm_core::ManifestFile { relative_path: "compose.yaml".to_string(), contents: b"services: {}".to_vec() }],
    }
}

#[tokio::test]
async fn poll_loop_feeds_desired_state_into_the_registry_until_stopped() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let registry = Registry::new();
    let control_plane = Arc::new(FakeControlPlaneClient::new());
    let manifest_store = Arc::new(ManifestStore::new(tmp.path().to_path_buf()));
    let deployer: Arc<dyn esm_adapters::Deployer> = Arc::new(esm_adapters::FakeDeployer::new(EngineType::DockerStandalone));

    let id = StackId::new(7);
    control_plane.set_config(sample_payload(id));
    let mut desired = BTreeMap::new();
    desired.insert(id, DesiredStackEntry { version: Version::new(1), ready_re_pull_image: false });
    control_plane.set_desired_state(desired);

    let reconciler = Reconciler::new(
        registry.clone(),
        deployer,
        Arc::clone(&manifest_store),
        StatusReporter::new(control_plane.clone() as Arc<dyn ControlPlaneClient>),
        tmp.path().to_path_buf(),
        "compose",
    );
    let intake = Intake::new(
        registry.clone(),
        control_plane.clone() as Arc<dyn ControlPlaneClient>,
        manifest_store,
        StatusReporter::new(control_plane.clone() as Arc<dyn ControlPlaneClient>),
        EngineType::DockerStandalone,
    );
    let engine = Arc::new(Engine::new(registry.clone(), TokioSleeper::new(), reconciler, intake));

    let stop = Arc::new(AtomicBool::new(false));
    let loop_stop = Arc::clone(&stop);
    let loop_engine = Arc::clone(&engine);
    let cp: Arc<dyn ControlPlaneClient> = control_plane.clone();
    let handle = tokio::spawn(poll_loop::run(loop_engine, cp, Duration::from_millis(5), loop_stop));

    tokio::time::sleep(Duration::from_millis(40)).await;
    stop.store(true, std::sync::atomic::Ordering::Release);
    let _ = tokio::time::timeout(Duration::from_secs(1), handle).await;

    let record = registry.lookup(id).expect("stack 7 should have been merged into the registry");
    assert_eq!(record.version, Version::new(1));
}
