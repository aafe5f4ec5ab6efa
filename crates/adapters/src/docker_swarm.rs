// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `docker stack` backed deployer for Swarm-mode engines.
//!
//! Validation and pulling reuse the `docker compose` CLI (Swarm
//! bundles are compose-file compatible); deploy/remove go through
//! `docker stack` since that is what actually understands Swarm
//! services.

use crate::deployer::{DeployContext, Deployer, DeployerError, EngineType, WaitOutcome};
use async_trait::async_trait;
use bollard::Docker;
use esm_core::{DeployerStatus, ManifestFile};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

pub struct DockerSwarmDeployer {
    docker: Docker,
}

impl DockerSwarmDeployer {
    pub fn new() -> Result<Self, DeployerError> {
        let docker = Docker::connect_with_local_defaults().map_err(|e| DeployerError::engine("<connect>", e))?;
        Ok(Self { docker })
    }

    async fn run(&self, stack_name: &str, ctx: &DeployContext, program_args: &[&str]) -> Result<(), DeployerError> {
        let output = Command::new("docker")
            .args(program_args)
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
impl Deployer for DockerSwarmDeployer {
    async fn validate(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        if !files.iter().any(|f| f.relative_path == ctx.entry_file) {
            return Err(DeployerError::Validation {
                stack_name: stack_name.to_string(),
                message: format!("entry file {:?} not present in manifest set", ctx.entry_file),
            });
        }
        self.run(stack_name, ctx, &["compose", "-f", &ctx.entry_file, "config", "--quiet"]).await
    }

    async fn pull(&self, stack_name: &str, _files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        self.run(stack_name, ctx, &["compose", "-f", &ctx.entry_file, "pull"]).await
    }

    async fn deploy(&self, stack_name: &str, _files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        self.run(stack_name, ctx, &["stack", "deploy", "-c", &ctx.entry_file, stack_name]).await
    }

    async fn remove(&self, stack_name: &str, _files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError> {
        self.run(stack_name, ctx, &["stack", "rm", stack_name]).await
    }

    async fn wait_for_status(
        &self,
        stack_name: &str,
        required: DeployerStatus,
        deadline: Duration,
    ) -> Result<WaitOutcome, DeployerError> {
        let filters = std::collections::HashMap::from([(
            "label".to_string(),
            vec![format!("com.docker.stack.namespace={stack_name}")],
        )]);
        let result = tokio::time::timeout(
            deadline,
            self.docker.list_tasks(Some(bollard::query_parameters::ListTasksOptions { filters: Some(filters) })),
        )
        .await;

        let tasks = match result {
            Err(_) => return Err(DeployerError::Timeout { stack_name: stack_name.to_string(), deadline }),
            Ok(Err(e)) => return Ok(WaitOutcome::error(e.to_string())),
            Ok(Ok(tasks)) => tasks,
        };

        if tasks.is_empty() {
            return Ok(match required {
                DeployerStatus::Removed => WaitOutcome::ok(DeployerStatus::Removed),
                _ => WaitOutcome::ok(DeployerStatus::Unknown),
            });
        }

        let all_running = tasks.iter().all(|t| {
            t.status.as_ref().and_then(|s| s.state).map(|s| format!("{s:?}").eq_ignore_ascii_case("running")).unwrap_or(false)
        });

        Ok(if all_running { WaitOutcome::ok(DeployerStatus::Running) } else { WaitOutcome::ok(DeployerStatus::Unknown) })
    }

    fn engine_type(&self) -> EngineType {
        EngineType::DockerSwarm
    }
}

#[cfg(test)]
#[path = "docker_swarm_tests.rs"]
mod tests;
