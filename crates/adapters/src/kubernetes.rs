// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes-backed deployer.
//!
//! Manifests are applied as a set of dynamic objects via server-side
//! apply, so the entry file may contain any mix of kinds (Deployment,
//! Job, ConfigMap, …) without this crate needing a generated type for
//! each one.
//!
//! `Pull` is a no-op here: kubelet performs image pulls itself once a
//! Pod spec is scheduled, there is nothing this deployer can do ahead
//! of `Deploy` (documented as an intentional asymmetry with the Docker
//! variants).

use crate::deployer::{DeployContext, Deployer, DeployerError, EngineType, WaitOutcome};
use async_trait::async_trait;
use esm_core::{DeployerStatus, ManifestFile};
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DynamicObject, Patch, PatchParams};
use kube::discovery::{ApiCapabilities, ApiResource, Discovery, Scope};
use kube::Client;
use serde::Deserialize;
use std::time::Duration;

pub struct KubernetesDeployer {
    client: Client,
}

const FIELD_MANAGER: &str = "esm-stack-manager";

impl KubernetesDeployer {
    pub async fn new() -> Result<Self, DeployerError> {
        let client = Client::try_default().await.map_err(|e| DeployerError::engine("<connect>", e))?;
        Ok(Self { client })
    }

    fn entry_docs(stack_name: &str, files: &[ManifestFile], entry_file: &str) -> Result<Vec<DynamicObject>, DeployerError> {
        let entry = files.iter().find(|f| f.relative_path == entry_file).ok_or_else(|| DeployerError::Validation {
            stack_name: stack_name.to_string(),
            message: format!("entry file {entry_file:?} not present in manifest set"),
        })?;
        let text = String::from_utf8_lossy(&entry.contents);
        let mut docs = Vec::new();
        for doc in serde_yaml_ng::Deserializer::from_str(&text) {
            let obj: DynamicObject = DynamicObject::deserialize(doc).map_err(|e| DeployerError::Validation {
                stack_name: stack_name.to_string(),
                message: format!("entry file did not decode as Kubernetes objects: {e}"),
            })?;
            docs.push(obj);
        }
        if docs.is_empty() {
            return Err(DeployerError::Validation {
                stack_name: stack_name.to_string(),
                message: "entry file contained no documents".to_string(),
            });
        }
        Ok(docs)
    }

    async fn resolve(&self, obj: &DynamicObject) -> Result<(ApiResource, ApiCapabilities), DeployerError> {
        let gvk = obj
            .types
            .as_ref()
            .ok_or_else(|| DeployerError::engine("<discovery>", "object missing apiVersion/kind"))
            .and_then(|t| {
                kube::api::GroupVersionKind::try_from(t).map_err(|e| DeployerError::engine("<discovery>", e))
            })?;
        let discovery = Discovery::new(self.client.clone())
            .run()
            .await
            .map_err(|e| DeployerError::engine("<discovery>", e))?;
        discovery
            .resolve_gvk(&gvk)
            .ok_or_else(|| DeployerError::engine("<discovery>", format!("no matching API resource for {gvk:?}")))
    }

    fn api_for(&self, resource: ApiResource, capabilities: ApiCapabilities, namespace: &str) -> Api<DynamicObject> {
        match capabilities.scope {
            Scope::Namespaced => Api::namespaced_with(self.client.clone(), namespace, &resource),
            Scope::Cluster => Api::all_with(self.client.clone(), &resource),
        }
    }
}

#[async_trait]
impl Deployer for KubernetesDeployer {
    async fn validate(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        Self::entry_docs(stack_name, files, &ctx.entry_file).map(|_| ())
    }

    async fn pull(&self, _stack_name: &str, _files: &[ManifestFile], _ctx: &DeployContext) -> Result<(), DeployerError> {
        Ok(())
    }

    async fn deploy(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        let docs = Self::entry_docs(stack_name, files, &ctx.entry_file)?;
        let pp = PatchParams::apply(FIELD_MANAGER).force();
        for obj in &docs {
            let (resource, caps) = self.resolve(obj).await?;
            let api = self.api_for(resource, caps, &ctx.namespace);
            let name = obj.metadata.name.as_deref().unwrap_or(stack_name);
            api.patch(name, &pp, &Patch::Apply(obj)).await.map_err(|e| DeployerError::engine(stack_name, e))?;
        }
        Ok(())
    }

    async fn remove(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        let docs = Self::entry_docs(stack_name, files, &ctx.entry_file)?;
        for obj in &docs {
            let (resource, caps) = self.resolve(obj).await?;
            let api = self.api_for(resource, caps, &ctx.namespace);
            let name = obj.metadata.name.as_deref().unwrap_or(stack_name);
            match api.delete(name, &Default::default()).await {
                Ok(_) => {}
                Err(kube::Error::Api(e)) if e.code == 404 => {}
                Err(e) => return Err(DeployerError::engine(stack_name, e)),
            }
        }
        Ok(())
    }

    async fn wait_for_status(
        &self,
        stack_name: &str,
        required: DeployerStatus,
        deadline: Duration,
    ) -> Result<WaitOutcome, DeployerError> {
        let pods: Api<Pod> = Api::namespaced(self.client.clone(), stack_name);
        let lp = kube::api::ListParams::default().labels(&format!("esm.io/stack={stack_name}"));
        let result = tokio::time::timeout(deadline, pods.list(&lp)).await;

        let list = match result {
            Err(_) => return Err(DeployerError::Timeout { stack_name: stack_name.to_string(), deadline }),
            Ok(Err(e)) => return Ok(WaitOutcome::error(e.to_string())),
            Ok(Ok(list)) => list,
        };

        if list.items.is_empty() {
            return Ok(match required {
                DeployerStatus::Removed => WaitOutcome::ok(DeployerStatus::Removed),
                _ => WaitOutcome::ok(DeployerStatus::Unknown),
            });
        }

        let all_running = list.items.iter().all(|p| {
            p.status.as_ref().and_then(|s| s.phase.as_deref()) == Some("Running")
        });

        // Compatibility shim (spec.md §9): this variant degrades `Completed`
        // to `Running` rather than distinguishing completed Jobs from
        // long-running Deployments — the core treats `Running` from a
        // Kubernetes-tagged deployer as potentially also `Completed`.
        Ok(if all_running { WaitOutcome::ok(DeployerStatus::Running) } else { WaitOutcome::ok(DeployerStatus::Unknown) })
    }

    fn engine_type(&self) -> EngineType {
        EngineType::Kubernetes
    }
}

#[cfg(test)]
#[path = "kubernetes_tests.rs"]
mod tests;
