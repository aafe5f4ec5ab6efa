// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn compose_file() -> ManifestFile {
    ManifestFile {
        relative_path: "docker-compose.yml".into(),
        contents: b"services:\n  web:\n    image: nginx\n".to_vec(),
    }
}

fn creds() -> RegistryCredentials {
    RegistryCredentials {
        username: "alice".into(),
        password: "hunter2".into(),
        registry: Some("registry.example.com".into()),
        cloud_registry: None,
    }
}

fn cloud_registry_creds() -> RegistryCredentials {
    RegistryCredentials {
        username: String::new(),
        password: String::new(),
        registry: None,
        cloud_registry: Some("ecr:123456789012".into()),
    }
}

#[test]
fn rewrite_fails_when_entry_file_absent() {
    let mut files = vec![compose_file()];
    let err = ManifestRewriter::rewrite(StackId::new(1), EngineType::DockerStandalone, &mut files, "missing.yml", None, true)
        .unwrap_err();
    assert!(matches!(err, StorageError::EntryFileMissing { .. }));
}

#[test]
fn compose_rewrite_is_noop_without_credentials_or_active_update() {
    let mut files = vec![compose_file()];
    let before = files[0].contents.clone();
    ManifestRewriter::rewrite(StackId::new(1), EngineType::DockerStandalone, &mut files, "docker-compose.yml", None, false)
        .unwrap();
    assert_eq!(files[0].contents, before);
}

#[test]
fn compose_rewrite_injects_updater_service_when_update_active() {
    let mut files = vec![compose_file()];
    ManifestRewriter::rewrite(
        StackId::new(1),
        EngineType::DockerSwarm,
        &mut files,
        "docker-compose.yml",
        Some(&creds()),
        true,
    )
    .unwrap();

    let text = String::from_utf8(files[0].contents.clone()).unwrap();
    assert!(text.contains("updater"));
    assert!(text.contains("hunter2"));
}

#[test]
fn compose_rewrite_injects_updater_service_for_cloud_registry_tag_alone() {
    let mut files = vec![compose_file()];
    ManifestRewriter::rewrite(
        StackId::new(1),
        EngineType::DockerStandalone,
        &mut files,
        "docker-compose.yml",
        Some(&cloud_registry_creds()),
        true,
    )
    .unwrap();

    let text = String::from_utf8(files[0].contents.clone()).unwrap();
    assert!(text.contains("updater"));
    assert!(text.contains("ecr:123456789012"));
}

#[test]
fn compose_rewrite_skips_updater_when_update_active_but_no_credentials() {
    let mut files = vec![compose_file()];
    ManifestRewriter::rewrite(StackId::new(1), EngineType::DockerStandalone, &mut files, "docker-compose.yml", None, true)
        .unwrap();

    let text = String::from_utf8(files[0].contents.clone()).unwrap();
    assert!(!text.contains("updater"), "no credentials or cloud registry config means nothing to inject (§6)");
}

#[test]
fn compose_rewrite_removes_updater_when_update_not_active() {
    let mut files = vec![ManifestFile {
        relative_path: "docker-compose.yml".into(),
        contents: b"services:\n  web:\n    image: nginx\n  updater:\n    image: stale\n".to_vec(),
    }];
    ManifestRewriter::rewrite(StackId::new(1), EngineType::DockerStandalone, &mut files, "docker-compose.yml", None, false)
        .unwrap();
    let text = String::from_utf8(files[0].contents.clone()).unwrap();
    assert!(!text.contains("updater"));
}

#[test]
fn kubernetes_rewrite_injects_image_pull_secret() {
    let mut files = vec![ManifestFile {
        relative_path: "manifest.yaml".into(),
        contents: b"apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\nspec:\n  template:\n    spec:\n      containers: []\n".to_vec(),
    }];
    ManifestRewriter::rewrite(StackId::new(1), EngineType::Kubernetes, &mut files, "manifest.yaml", Some(&creds()), true)
        .unwrap();

    let text = String::from_utf8(files[0].contents.clone()).unwrap();
    assert!(text.contains("imagePullSecrets"));
}

#[test]
fn kubernetes_rewrite_is_noop_without_credentials() {
    let mut files = vec![ManifestFile {
        relative_path: "manifest.yaml".into(),
        contents: b"apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n".to_vec(),
    }];
    let before = files[0].contents.clone();
    ManifestRewriter::rewrite(StackId::new(1), EngineType::Kubernetes, &mut files, "manifest.yaml", None, true).unwrap();
    assert_eq!(files[0].contents, before);
}
