// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP-backed deployer for HashiCorp Nomad, talking to the Nomad HTTP
//! API directly (no official async Rust client exists with the
//! coverage this needs).
//!
//! The entry file is expected to be a Nomad job specification encoded
//! as JSON (Nomad's `/v1/jobs` endpoint accepts job specs in JSON
//! natively; HCL would require shelling out to `nomad job run`, which
//! this variant avoids to stay API-driven like the Kubernetes variant).

use crate::deployer::{DeployContext, Deployer, DeployerError, EngineType, WaitOutcome};
use async_trait::async_trait;
use esm_core::{DeployerStatus, ManifestFile};
use serde_json::Value;
use std::time::Duration;

pub struct NomadDeployer {
    client: reqwest::Client,
    base_url: String,
}

impl NomadDeployer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { client: reqwest::Client::new(), base_url: base_url.into() }
    }

    fn entry_job(stack_name: &str, files: &[ManifestFile], entry_file: &str) -> Result<Value, DeployerError> {
        let entry = files.iter().find(|f| f.relative_path == entry_file).ok_or_else(|| DeployerError::Validation {
            stack_name: stack_name.to_string(),
            message: format!("entry file {entry_file:?} not present in manifest set"),
        })?;
        serde_json::from_slice(&entry.contents).map_err(|e| DeployerError::Validation {
            stack_name: stack_name.to_string(),
            message: format!("entry file is not a valid Nomad job spec: {e}"),
        })
    }
}

#[async_trait]
impl Deployer for NomadDeployer {
    async fn validate(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        let job = Self::entry_job(stack_name, files, &ctx.entry_file)?;
        let resp = self
            .client
            .post(format!("{}/v1/validate/job", self.base_url))
            .json(&serde_json::json!({ "Job": job }))
            .send()
            .await
            .map_err(|e| DeployerError::engine(stack_name, e))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            let body = resp.text().await.unwrap_or_default();
            Err(DeployerError::Validation { stack_name: stack_name.to_string(), message: body })
        }
    }

    async fn pull(&self, _stack_name: &str, _files: &[ManifestFile], _ctx: &DeployContext) -> Result<(), DeployerError> {
        // Nomad clients pull images as part of task placement; there is no
        // separate pull phase to drive ahead of `deploy`.
        Ok(())
    }

    async fn deploy(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        let job = Self::entry_job(stack_name, files, &ctx.entry_file)?;
        let resp = self
            .client
            .post(format!("{}/v1/jobs", self.base_url))
            .json(&serde_json::json!({ "Job": job }))
            .send()
            .await
            .map_err(|e| DeployerError::engine(stack_name, e))?;
        if resp.status().is_success() {
            Ok(())
        } else {
            Err(DeployerError::engine(stack_name, resp.text().await.unwrap_or_default()))
        }
    }

    async fn remove(&self, stack_name: &str, _files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        let job_id = if ctx.namespace.is_empty() { stack_name.to_string() } else { format!("{stack_name}@{}", ctx.namespace) };
        let resp = self
            .client
            .delete(format!("{}/v1/job/{job_id}?purge=true", self.base_url))
            .send()
            .await
            .map_err(|e| DeployerError::engine(stack_name, e))?;
        if resp.status().is_success() || resp.status() == reqwest::StatusCode::NOT_FOUND {
            Ok(())
        } else {
            Err(DeployerError::engine(stack_name, resp.text().await.unwrap_or_default()))
        }
    }

    async fn wait_for_status(
        &self,
        stack_name: &str,
        required: DeployerStatus,
        deadline: Duration,
    ) -> Result<WaitOutcome, DeployerError> {
        let request = self.client.get(format!("{}/v1/job/{stack_name}/summary", self.base_url)).send();
        let result = tokio::time::timeout(deadline, request).await;

        let resp = match result {
            Err(_) => return Err(DeployerError::Timeout { stack_name: stack_name.to_string(), deadline }),
            Ok(Err(e)) => return Ok(WaitOutcome::error(e.to_string())),
            Ok(Ok(resp)) => resp,
        };

        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(match required {
                DeployerStatus::Removed => WaitOutcome::ok(DeployerStatus::Removed),
                _ => WaitOutcome::ok(DeployerStatus::Unknown),
            });
        }
        if !resp.status().is_success() {
            return Ok(WaitOutcome::error(resp.text().await.unwrap_or_default()));
        }

        let summary: Value = resp.json().await.map_err(|e| DeployerError::engine(stack_name, e))?;
        let running = summary
            .get("Summary")
            .and_then(|groups| groups.as_object())
            .map(|groups| groups.values().all(|g| g.get("Running").and_then(Value::as_i64).unwrap_or(0) > 0))
            .unwrap_or(false);
        let complete = summary
            .get("Summary")
            .and_then(|groups| groups.as_object())
            .map(|groups| groups.values().all(|g| g.get("Complete").and_then(Value::as_i64).unwrap_or(0) > 0))
            .unwrap_or(false);

        Ok(if complete && required == DeployerStatus::Completed {
            WaitOutcome::ok(DeployerStatus::Completed)
        } else if running {
            WaitOutcome::ok(DeployerStatus::Running)
        } else {
            WaitOutcome::ok(DeployerStatus::Unknown)
        })
    }

    fn engine_type(&self) -> EngineType {
        EngineType::Nomad
    }
}

#[cfg(test)]
#[path = "nomad_tests.rs"]
mod tests;
