// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `ControlPlaneClient` capability set (`spec.md` §6): the single
//! seam between the reconciliation engine and the remote control
//! plane that declares desired stacks and receives status reports.

use crate::error::ControlPlaneError;
use crate::payload::{DesiredState, StackPayload};
use async_trait::async_trait;
use esm_core::{RollbackTag, StackId, StatusKind, Version};

/// `{identity, status-kind, rollbackTag, message}` (`spec.md` §4.7).
#[derive(Debug, Clone)]
pub struct StatusReport {
    pub id: StackId,
    pub kind: StatusKind,
    pub rollback_to: RollbackTag,
    pub message: Option<String>,
}

/// The remote control plane's two operations (`spec.md` §6):
/// full-manifest fetch and status reporting. Implementations may also
/// offer a way to fetch the periodic desired-state snapshot that
/// drives Poll Intake (`poll_desired_state`) — that cadence itself is
/// an out-of-scope daemon concern (`spec.md` §1), but the trait lives
/// here because the fetch shape is part of the wire contract.
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Full manifest and metadata for `id` at `version`.
    async fn get_edge_stack_config(&self, id: StackId, version: Version) -> Result<StackPayload, ControlPlaneError>;

    /// Idempotent status report. Errors are logged and not propagated
    /// by callers (`spec.md` §7) — this trait still returns a
    /// `Result` so callers can log the specific failure.
    async fn set_edge_stack_status(&self, report: StatusReport) -> Result<(), ControlPlaneError>;

    /// The control plane's current desired-state snapshot, driving the
    /// daemon's poll loop (`spec.md` §1's `ControlPlaneClient`
    /// abstraction; see `esm-daemon`'s poll-loop driver).
    async fn poll_desired_state(&self) -> Result<DesiredState, ControlPlaneError>;
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
