// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Deployer` capability set (`spec.md` §6): the single polymorphic
//! seam between the reconciliation engine and the four supported
//! orchestrators.

use async_trait::async_trait;
pub use esm_core::EngineType;
use esm_core::{DeployerStatus, ManifestFile};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// The engine-independent context every `Deployer` call needs: where
/// the manifest lives on disk, what namespace to target, and the
/// process environment to materialize alongside it.
#[derive(Debug, Clone, Default)]
pub struct DeployContext {
    pub namespace: String,
    pub working_dir: PathBuf,
    pub env: BTreeMap<String, String>,
    /// Name of the manifest file to hand the engine (the compose file,
    /// the Kubernetes manifest, the Nomad job spec). Engine-independent
    /// in name only — every variant needs to know which file among
    /// `files` is the one to converge on.
    pub entry_file: String,
}

/// The result of a `WaitForStatus` observation (§6): a single observed
/// status plus an optional deployer-native error message.
#[derive(Debug, Clone)]
pub struct WaitOutcome {
    pub status: DeployerStatus,
    pub error_message: Option<String>,
}

impl WaitOutcome {
    pub fn ok(status: DeployerStatus) -> Self {
        Self { status, error_message: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { status: DeployerStatus::Error, error_message: Some(message.into()) }
    }
}

#[derive(Debug, Error)]
pub enum DeployerError {
    #[error("validation failed for stack {stack_name}: {message}")]
    Validation { stack_name: String, message: String },

    #[error("I/O error for stack {stack_name}: {source}")]
    Io { stack_name: String, #[source] source: std::io::Error },

    #[error("engine call failed for stack {stack_name}: {message}")]
    Engine { stack_name: String, message: String },

    #[error("observation of stack {stack_name} timed out after {deadline:?}")]
    Timeout { stack_name: String, deadline: Duration },
}

impl DeployerError {
    pub fn engine(stack_name: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::Engine { stack_name: stack_name.into(), message: message.to_string() }
    }
}

/// The engine-polymorphic capability set the Reconciler drives a stack
/// through (`spec.md` §6). One implementation per [`EngineType`].
#[async_trait]
pub trait Deployer: Send + Sync {
    /// Validate that `files` decode into a manifest this engine can
    /// act on. Fails with a validation error or an I/O error.
    async fn validate(
        &self,
        stack_name: &str,
        files: &[ManifestFile],
        ctx: &DeployContext,
    ) -> Result<(), DeployerError>;

    /// Idempotent image acquisition.
    async fn pull(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext) -> Result<(), DeployerError>;

    /// Idempotent convergence to the manifest.
    async fn deploy(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext)
        -> Result<(), DeployerError>;

    /// Idempotent tear-down.
    async fn remove(&self, stack_name: &str, files: &[ManifestFile], ctx: &DeployContext)
        -> Result<(), DeployerError>;

    /// Observe the workload once against `required`, with `deadline` as
    /// the caller-scoped timeout (60 s for status waits, 1 s for the
    /// `Deployed` peek — §4.2).
    async fn wait_for_status(
        &self,
        stack_name: &str,
        required: DeployerStatus,
        deadline: Duration,
    ) -> Result<WaitOutcome, DeployerError>;

    /// The engine this deployer implements, for logging.
    fn engine_type(&self) -> EngineType;
}

#[cfg(test)]
#[path = "deployer_tests.rs"]
mod tests;
