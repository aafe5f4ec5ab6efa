// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `docker compose` backed deployer for single-node Docker engines.
//!
//! Shells out to the `docker compose` CLI rather than driving the
//! Engine API file-by-file: compose's own convergence logic (pull,
//! recreate, network/volume reconciliation) is exactly what `Deploy`
//! needs, and re-implementing it against `bollard` would just be a
//! worse compose.

use crate::deployer::{DeployContext, Deployer, DeployerError, EngineType, WaitOutcome};
use async_trait::async_trait;
use bollard::Docker;
use esm_core::{DeployerStatus, ManifestFile};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Drives `docker compose` against a working directory that already
/// holds the persisted manifest tree, and uses `bollard` only for the
/// container-state peek `WaitForStatus` needs.
pub struct DockerStandaloneDeployer {
    docker: Docker,
}

impl DockerStandaloneDeployer {
    pub fn new() -> Result<Self, DeployerError> {
        let docker = Docker::connect_with_local_defaults()
            .map_err(|e| DeployerError::engine("<connect>", e))?;
        Ok(Self { docker })
    }

    async fn compose(&self, stack_name: &str, ctx: &DeployContext, args: &[&str]) -> Result<(), DeployerError> {
        let output = Command::new("docker")
            .arg("compose")
            .arg("-f")
            .arg(&ctx.entry_file)
            .arg("-p")
            .arg(stack_name)
            .args(args)
            .current_dir(&ctx.working_dir)
            .envs(&ctx.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| DeployerError::Io { stack_name: stack_name.to_string(), source: e })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(DeployerError::engine(stack_name, String::from_utf8_lossy(&output.stderr)))
        }
    }
}

#[async_trait]
impl Deployer for DockerStandaloneDeployer {
    async fn validate(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        if !files.iter().any(|f| f.relative_path == ctx.entry_file) {
            return Err(DeployerError::Validation {
                stack_name: stack_name.to_string(),
                message: format!("entry file {:?} not present in manifest set", ctx.entry_file),
            });
        }
        self.compose(stack_name, ctx, &["config", "--quiet"]).await
    }

    async fn pull(&self, stack_name: &str, _files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        self.compose(stack_name, ctx, &["pull"]).await
    }

    async fn deploy(&self, stack_name: &str, _files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        self.compose(stack_name, ctx, &["up", "-d", "--remove-orphans"]).await
    }

    async fn remove(&self, stack_name: &str, _files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        self.compose(stack_name, ctx, &["down", "--volumes"]).await
    }

    async fn wait_for_status(
        &self,
        stack_name: &str,
        required: DeployerStatus,
        deadline: Duration,
    ) -> Result<WaitOutcome, DeployerError> {
        let filters = std::collections::HashMap::from([
            ("label".to_string(), vec![format!("com.docker.compose.project={stack_name}")]),
        ]);
        let result = tokio::time::timeout(
            deadline,
            self.docker.list_containers(Some(bollard::query_parameters::ListContainersOptions {
                all: true,
                filters: Some(filters),
                ..Default::default()
            })),
        )
        .await;

        let containers = match result {
            Err(_) => return Err(DeployerError::Timeout { stack_name: stack_name.to_string(), deadline }),
            Ok(Err(e)) => return Ok(WaitOutcome::error(e.to_string())),
            Ok(Ok(containers)) => containers,
        };

        if containers.is_empty() {
            return Ok(match required {
                DeployerStatus::Removed => WaitOutcome::ok(DeployerStatus::Removed),
                _ => WaitOutcome::ok(DeployerStatus::Unknown),
            });
        }

        let all_running = containers.iter().all(|c| c.state.as_deref() == Some("running"));
        let all_exited = containers.iter().all(|c| c.state.as_deref() == Some("exited"));

        Ok(if all_running {
            WaitOutcome::ok(DeployerStatus::Running)
        } else if all_exited && required == DeployerStatus::Completed {
            WaitOutcome::ok(DeployerStatus::Completed)
        } else {
            WaitOutcome::ok(DeployerStatus::Unknown)
        })
    }

    fn engine_type(&self) -> EngineType {
        EngineType::DockerStandalone
    }
}

#[cfg(test)]
#[path = "docker_standalone_tests.rs"]
mod tests;
