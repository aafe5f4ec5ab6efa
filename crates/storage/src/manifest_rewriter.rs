// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Entry-file rewriting for registry credentials (`spec.md` §6's
//! `ManifestRewriter` interface).
//!
//! Docker variants (`DockerStandalone`, `DockerSwarm`) inject
//! credentials as environment variables into an `updater` service in
//! the compose file, present only while an update is active. The
//! Kubernetes variant instead injects `imagePullSecrets` references
//! into every Pod-template-bearing object.

use crate::error::StorageError;
use esm_core::{EngineType, ManifestFile, RegistryCredentials, StackId};
use serde::Deserialize;
use serde_yaml_ng::Value;

pub struct ManifestRewriter;

impl ManifestRewriter {
    /// Rewrite the entry file among `files` in place, injecting
    /// `credentials` per `engine_type`'s convention. `update_active`
    /// gates the Docker variants' `updater` service injection — it is
    /// only materialized while an update is in flight (§6).
    ///
    /// Fails if the entry file is absent from `files`.
    pub fn rewrite(
        id: StackId,
        engine_type: EngineType,
        files: &mut [ManifestFile],
        entry_file: &str,
        credentials: Option<&RegistryCredentials>,
        update_active: bool,
    ) -> Result<(), StorageError> {
        let entry = files.iter_mut().find(|f| f.relative_path == entry_file).ok_or_else(|| {
            StorageError::EntryFileMissing { id, entry: entry_file.to_string() }
        })?;

        match engine_type {
            EngineType::Kubernetes => rewrite_kubernetes(id, entry, credentials),
            _ => rewrite_compose(id, entry, credentials, update_active),
        }
    }
}

fn parse_yaml(id: StackId, entry: &str, bytes: &[u8]) -> Result<Value, StorageError> {
    serde_yaml_ng::from_slice(bytes).map_err(|e| StorageError::RewriteFailed {
        id,
        entry: entry.to_string(),
        message: e.to_string(),
    })
}

fn dump_yaml(id: StackId, entry: &str, value: &Value) -> Result<Vec<u8>, StorageError> {
    serde_yaml_ng::to_string(value).map(String::into_bytes).map_err(|e| StorageError::RewriteFailed {
        id,
        entry: entry.to_string(),
        message: e.to_string(),
    })
}

fn rewrite_compose(
    id: StackId,
    entry: &mut ManifestFile,
    credentials: Option<&RegistryCredentials>,
    update_active: bool,
) -> Result<(), StorageError> {
    if credentials.is_none() && !update_active {
        return Ok(());
    }

    let mut doc = parse_yaml(id, &entry.relative_path, &entry.contents)?;
    let mapping = doc.as_mapping_mut().ok_or_else(|| StorageError::RewriteFailed {
        id,
        entry: entry.relative_path.clone(),
        message: "compose file root is not a mapping".to_string(),
    })?;

    let services = mapping
        .entry(Value::String("services".to_string()))
        .or_insert_with(|| Value::Mapping(Default::default()));
    let services = services.as_mapping_mut().ok_or_else(|| StorageError::RewriteFailed {
        id,
        entry: entry.relative_path.clone(),
        message: "compose `services` key is not a mapping".to_string(),
    })?;

    // §6: the `updater` service is only materialized when an update is
    // active *and* there is something to inject — static credentials or
    // a cloud-registry tag. Neither present means no injection, same as
    // `!update_active`.
    let injectable = credentials.filter(|c| {
        !c.username.is_empty() || !c.password.is_empty() || c.registry.is_some() || c.cloud_registry.is_some()
    });

    if !update_active || injectable.is_none() {
        services.shift_remove(&Value::String("updater".to_string()));
    } else {
        let creds = injectable.expect("checked above");
        let mut updater_env = serde_yaml_ng::Mapping::new();
        updater_env.insert(Value::String("REGISTRY_USERNAME".into()), Value::String(creds.username.clone()));
        updater_env.insert(Value::String("REGISTRY_PASSWORD".into()), Value::String(creds.password.clone()));
        if let Some(registry) = &creds.registry {
            updater_env.insert(Value::String("REGISTRY_URL".into()), Value::String(registry.clone()));
        }
        if let Some(cloud_registry) = &creds.cloud_registry {
            updater_env.insert(Value::String("REGISTRY_CLOUD_TAG".into()), Value::String(cloud_registry.clone()));
        }
        let mut updater_service = serde_yaml_ng::Mapping::new();
        updater_service.insert(Value::String("environment".into()), Value::Mapping(updater_env));
        services.insert(Value::String("updater".into()), Value::Mapping(updater_service));
    }

    entry.contents = dump_yaml(id, &entry.relative_path, &doc)?;
    Ok(())
}

fn rewrite_kubernetes(
    id: StackId,
    entry: &mut ManifestFile,
    credentials: Option<&RegistryCredentials>,
) -> Result<(), StorageError> {
    let Some(creds) = credentials else {
        return Ok(());
    };
    let secret_name = creds
        .registry
        .as_deref()
        .map(|r| format!("esm-pull-secret-{}", r.replace(['.', ':', '/'], "-")))
        .unwrap_or_else(|| "esm-pull-secret".to_string());

    let mut docs = Vec::new();
    for doc in serde_yaml_ng::Deserializer::from_slice(&entry.contents) {
        let mut value = Value::deserialize(doc).map_err(|e| StorageError::RewriteFailed {
            id,
            entry: entry.relative_path.clone(),
            message: e.to_string(),
        })?;
        inject_image_pull_secret(&mut value, &secret_name);
        docs.push(value);
    }

    let mut rendered = String::new();
    for doc in &docs {
        rendered.push_str("---\n");
        rendered.push_str(&serde_yaml_ng::to_string(doc).map_err(|e| StorageError::RewriteFailed {
            id,
            entry: entry.relative_path.clone(),
            message: e.to_string(),
        })?);
    }
    entry.contents = rendered.into_bytes();
    Ok(())
}

/// Walk `obj.spec.template.spec` (the Pod template spec present on
/// Deployment/Job/StatefulSet/DaemonSet) and append an
/// `imagePullSecrets` entry if not already present.
fn inject_image_pull_secret(doc: &mut Value, secret_name: &str) {
    use serde_yaml_ng::Mapping;

    let Some(mapping) = doc.as_mapping_mut() else { return };
    let Some(spec) = mapping.get_mut("spec").and_then(Value::as_mapping_mut) else { return };
    let Some(template) = spec.get_mut("template").and_then(Value::as_mapping_mut) else { return };
    let Some(pod_spec) = template.get_mut("spec").and_then(Value::as_mapping_mut) else { return };

    let secrets = pod_spec
        .entry(Value::String("imagePullSecrets".to_string()))
        .or_insert_with(|| Value::Sequence(Vec::new()));
    let Some(secrets) = secrets.as_sequence_mut() else { return };

    let mut entry = Mapping::new();
    entry.insert(Value::String("name".into()), Value::String(secret_name.to_string()));
    let entry = Value::Mapping(entry);
    if !secrets.contains(&entry) {
        secrets.push(entry);
    }
}

#[cfg(test)]
#[path = "manifest_rewriter_tests.rs"]
mod tests;
