// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observed status vocabulary (`spec.md` §4.2) and the status-kinds the
//! [`crate::stack` record] reports to the control plane (§4.7).

use serde::{Deserialize, Serialize};

/// The observed state of a stack record, as tracked by the Reconciler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObservedStatus {
    /// Action owed; eligible for scheduling.
    Pending,
    /// Reconciler currently running pull/deploy against the deployer.
    Deploying,
    /// Last attempt failed transiently; re-elevated to `Pending` on the
    /// next scheduling pass.
    Retry,
    /// Deploy call returned success; waiting for the workload to report
    /// `Running` (or `Completed` for a one-shot updater).
    AwaitingDeployedStatus,
    /// Workload observed as `Running`. Periodically re-checked for
    /// one-shot completion.
    Deployed,
    /// One-shot workload observed as `Completed`. Terminal-positive.
    Completed,
    /// Remove call in progress.
    Removing,
    /// Remove returned success; waiting for the workload to report
    /// `Removed`.
    AwaitingRemovedStatus,
    /// Terminal-negative.
    Error,
}

crate::simple_display! {
    ObservedStatus {
        Pending => "Pending",
        Deploying => "Deploying",
        Retry => "Retry",
        AwaitingDeployedStatus => "AwaitingDeployedStatus",
        Deployed => "Deployed",
        Completed => "Completed",
        Removing => "Removing",
        AwaitingRemovedStatus => "AwaitingRemovedStatus",
        Error => "Error",
    }
}

impl ObservedStatus {
    /// Whether this status is one of the three the Scheduler polls for
    /// observation (§4.3 rules 2 and 4).
    pub fn is_awaiting_observation(self) -> bool {
        matches!(
            self,
            Self::AwaitingDeployedStatus | Self::AwaitingRemovedStatus | Self::Deployed
        )
    }

    /// A steady status permitted when `Action = Idle` (§3 invariants).
    pub fn is_steady(self) -> bool {
        matches!(
            self,
            Self::AwaitingDeployedStatus | Self::Deployed | Self::Completed | Self::AwaitingRemovedStatus
        )
    }
}

/// The status-kind reported to the control plane (§4.7). Distinct from
/// [`ObservedStatus`]: this is a wire-level event, not a record field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatusKind {
    Acknowledged,
    ImagesPulled,
    Deploying,
    DeploymentReceived,
    Error,
    Running,
    Completed,
    Removing,
    Removed,
}

crate::simple_display! {
    StatusKind {
        Acknowledged => "Acknowledged",
        ImagesPulled => "ImagesPulled",
        Deploying => "Deploying",
        DeploymentReceived => "DeploymentReceived",
        Error => "Error",
        Running => "Running",
        Completed => "Completed",
        Removing => "Removing",
        Removed => "Removed",
    }
}

/// The status an observation call reports back, per
/// `Deployer.WaitForStatus` (§6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DeployerStatus {
    Running,
    Completed,
    Removed,
    Error,
    Unknown,
}

crate::simple_display! {
    DeployerStatus {
        Running => "Running",
        Completed => "Completed",
        Removed => "Removed",
        Error => "Error",
        Unknown => "Unknown",
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
