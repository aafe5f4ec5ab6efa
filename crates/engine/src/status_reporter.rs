// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fire-and-forget status emission (`spec.md` §4.7, §7): a status
//! report failure is logged and never propagated — the next poll
//! re-converges, so nothing here returns a `Result` to its caller.

use esm_core::{RollbackTag, StackId, StatusKind};
use esm_wire::{ControlPlaneClient, StatusReport};
use std::sync::Arc;

pub struct StatusReporter {
    client: Arc<dyn ControlPlaneClient>,
}

impl StatusReporter {
    pub fn new(client: Arc<dyn ControlPlaneClient>) -> Self {
        Self { client }
    }

    pub async fn report(&self, id: StackId, kind: StatusKind, rollback_to: RollbackTag, message: Option<String>) {
        let report = StatusReport { id, kind, rollback_to, message };
        if let Err(err) = self.client.set_edge_stack_status(report).await {
            tracing::warn!(stack_id = %id, status_kind = %kind, error = %err, "failed to report stack status to control plane");
        }
    }
}

#[cfg(test)]
#[path = "status_reporter_tests.rs"]
mod tests;
