// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[tokio::test]
async fn validate_rejects_missing_entry_file() {
    let Ok(deployer) = DockerStandaloneDeployer::new() else {
        return; // no local docker socket in this environment
    };
    let ctx = DeployContext { entry_file: "docker-compose.yml".into(), ..Default::default() };
    let err = deployer.validate("missing-entry", &[], &ctx).await.unwrap_err();
    assert!(matches!(err, DeployerError::Validation { .. }));
}

#[tokio::test]
#[ignore = "requires a local docker daemon and the compose CLI plugin"]
async fn full_compose_lifecycle() {
    let deployer = DockerStandaloneDeployer::new().unwrap();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("docker-compose.yml"),
        "services:\n  sleeper:\n    image: alpine\n    command: sleep 5\n",
    )
    .unwrap();
    let ctx = DeployContext { entry_file: "docker-compose.yml".into(), working_dir: dir.path().to_path_buf(), ..Default::default() };
    let files = vec![ManifestFile { relative_path: "docker-compose.yml".into(), contents: vec![] }];

    deployer.validate("esm-test-stack", &files, &ctx).await.unwrap();
    deployer.deploy("esm-test-stack", &files, &ctx).await.unwrap();
    let outcome = deployer
        .wait_for_status("esm-test-stack", DeployerStatus::Running, Duration::from_secs(10))
        .await
        .unwrap();
    assert_eq!(outcome.status, DeployerStatus::Running);
    deployer.remove("esm-test-stack", &files, &ctx).await.unwrap();
}
