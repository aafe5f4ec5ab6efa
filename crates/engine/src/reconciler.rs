// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The per-stack state machine (`spec.md` §4.2): one call per
//! scheduling pass, driving a record through validate → pull → deploy
//! → observe, or through remove → observe, calling out to the
//! `Deployer` and `ManifestStore` and writing results back through the
//! Registry's copy-on-modify discipline (§5).

use crate::status_reporter::StatusReporter;
use esm_adapters::{DeployContext, Deployer};
use esm_core::{
    should_skip_retry, Action, DeployerStatus, ManifestFile, ObservedStatus, Registry, StackRecord, StatusKind, MAX_RETRIES,
};
use esm_storage::ManifestStore;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Deadline for a normal `WaitForStatus` observation (`spec.md` §6).
const STATUS_WAIT_DEADLINE: Duration = Duration::from_secs(60);

/// Deadline for the `Deployed` one-shot completion peek (`spec.md`
/// §4.2: "an additional short 1 s deadline — a peek, not a wait").
const DEPLOYED_PEEK_DEADLINE: Duration = Duration::from_secs(1);

pub struct Reconciler {
    registry: Registry,
    deployer: Arc<dyn Deployer>,
    manifest_store: Arc<ManifestStore>,
    status_reporter: StatusReporter,
    /// `SupportRelativePath` host-visible root (`spec.md` §6); under
    /// it, `<composePrefix>/<stackID>/` is materialized.
    host_filesystem_path: PathBuf,
    compose_prefix: String,
}

impl Reconciler {
    pub fn new(
        registry: Registry,
        deployer: Arc<dyn Deployer>,
        manifest_store: Arc<ManifestStore>,
        status_reporter: StatusReporter,
        host_filesystem_path: PathBuf,
        compose_prefix: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            deployer,
            manifest_store,
            status_reporter,
            host_filesystem_path,
            compose_prefix: compose_prefix.into(),
        }
    }

    /// Run exactly one reconciliation pass for `record`, as handed back
    /// by the Scheduler. Dispatches on the record's current status and
    /// action; every branch ends by writing the resulting state back
    /// into the Registry (or removing it, for an observed `Removed`).
    pub async fn reconcile(&self, record: StackRecord) {
        match record.status {
            ObservedStatus::AwaitingDeployedStatus | ObservedStatus::AwaitingRemovedStatus | ObservedStatus::Deployed => {
                self.reconcile_observation(record).await;
            }
            ObservedStatus::Pending if record.action == Action::Delete => {
                self.reconcile_delete(record).await;
            }
            ObservedStatus::Pending if record.action.is_deploy_family() => {
                self.reconcile_deploy_family(record).await;
            }
            other => {
                tracing::warn!(stack_id = %record.id, status = %other, action = %record.action, "scheduler handed back a record in an unreconcilable state");
            }
        }
    }

    /// Write back only the fields this pass owns — `status`, `action`,
    /// and the retry counters (§5 rule 2) — guarded by `record`'s
    /// `generation` at the point it was handed to this pass.
    ///
    /// If a poll or command intake rewrote the record (`reset_for_update`
    /// / `mark_for_delete`) while this call was suspended in a
    /// `Deployer`/control-plane call, `generation` has since moved on
    /// and the merge is dropped rather than clobbering the newer desired
    /// state — the next scheduling pass reconciles what intake already
    /// wrote (§5's ordering guarantee).
    fn write_back(&self, record: &StackRecord) {
        let status = record.status;
        let action = record.action;
        let pull_count = record.pull_count;
        let pull_finished = record.pull_finished;
        let deploy_count = record.deploy_count;
        let applied = self.registry.merge_observed(record.id, record.generation, |current| {
            current.status = status;
            current.action = action;
            current.pull_count = pull_count;
            current.pull_finished = pull_finished;
            current.deploy_count = deploy_count;
        });
        if !applied {
            tracing::debug!(stack_id = %record.id, "write-back dropped: intake rewrote the record during this pass");
        }
    }

    fn deploy_context(&self, record: &StackRecord) -> DeployContext {
        DeployContext {
            namespace: record.metadata.namespace.clone(),
            working_dir: record.metadata.working_dir.clone(),
            env: record.metadata.env.clone(),
            entry_file: record.metadata.entry_file.clone(),
        }
    }

    /// Steps 1–5 of the `Deploy`/`Update` transition table (`spec.md`
    /// §4.2).
    async fn reconcile_deploy_family(&self, mut record: StackRecord) {
        let stack_id = record.id;
        let stack_name = stack_id.to_string();
        let live_dir = self.manifest_store.live_dir(stack_id);

        let files: Vec<ManifestFile> = match self.manifest_store.decode_dir_entries(stack_id, &live_dir).await {
            Ok(files) => files,
            Err(err) => return self.fail(record, err.to_string()).await,
        };
        let ctx = self.deploy_context(&record);

        // Step 1.
        if let Err(err) = self.deployer.validate(&stack_name, &files, &ctx).await {
            return self.fail(record, err.to_string()).await;
        }

        // Step 2.
        if record.metadata.flags.wants_pull() && !record.pull_finished {
            record.status = ObservedStatus::Deploying;
            record.pull_count += 1;
            self.write_back(&record);

            if should_skip_retry(record.pull_count) {
                record.status = ObservedStatus::Retry;
                self.write_back(&record);
                return;
            }

            match self.deployer.pull(&stack_name, &files, &ctx).await {
                Ok(()) => {
                    record.pull_finished = true;
                    self.write_back(&record);
                    self.status_reporter
                        .report(stack_id, StatusKind::ImagesPulled, record.metadata.rollback_to.clone(), None)
                        .await;
                }
                Err(_) if record.pull_count < MAX_RETRIES => {
                    record.status = ObservedStatus::Retry;
                    self.write_back(&record);
                    return;
                }
                Err(err) => return self.fail(record, err.to_string()).await,
            }
        }

        // Step 3.
        if record.metadata.flags.support_relative_path {
            if let Err(err) =
                self.manifest_store.copy_to_host(&self.host_filesystem_path, &self.compose_prefix, stack_id).await
            {
                return self.fail(record, err.to_string()).await;
            }
        }

        // Step 4.
        record.deploy_count += 1;
        if should_skip_retry(record.deploy_count) {
            record.status = ObservedStatus::Retry;
            self.write_back(&record);
            return;
        }

        // Step 5.
        self.status_reporter.report(stack_id, StatusKind::Deploying, record.metadata.rollback_to.clone(), None).await;
        record.status = ObservedStatus::Deploying;
        self.write_back(&record);

        match self.deployer.deploy(&stack_name, &files, &ctx).await {
            Ok(()) => {
                if let Err(err) = self.manifest_store.snapshot_to_success(stack_id).await {
                    tracing::warn!(stack_id = %stack_id, %err, "failed to snapshot live manifest to success directory");
                }
                self.status_reporter
                    .report(stack_id, StatusKind::DeploymentReceived, record.metadata.rollback_to.clone(), None)
                    .await;
                record.action = Action::Idle;
                record.status = ObservedStatus::AwaitingDeployedStatus;
                self.write_back(&record);
            }
            Err(_) if record.metadata.flags.retry_deploy && record.deploy_count < MAX_RETRIES => {
                record.status = ObservedStatus::Retry;
                self.write_back(&record);
            }
            Err(err) => self.fail(record, err.to_string()).await,
        }
    }

    /// Steps 1–3 of the `Delete` transition table (`spec.md` §4.2).
    async fn reconcile_delete(&self, mut record: StackRecord) {
        let stack_id = record.id;
        let stack_name = stack_id.to_string();
        let success_dir = self.manifest_store.success_dir(stack_id);

        let files: Vec<ManifestFile> = match self.manifest_store.decode_dir_entries(stack_id, &success_dir).await {
            Ok(files) => files,
            Err(err) => {
                tracing::warn!(stack_id = %stack_id, %err, "failed to read success manifest for removal, retrying next pass");
                return;
            }
        };
        let ctx = DeployContext {
            namespace: record.metadata.namespace.clone(),
            working_dir: success_dir,
            env: record.metadata.env.clone(),
            entry_file: record.metadata.entry_file.clone(),
        };

        record.status = ObservedStatus::Removing;
        self.write_back(&record);

        match self.deployer.remove(&stack_name, &files, &ctx).await {
            Ok(()) => {
                self.status_reporter.report(stack_id, StatusKind::Removing, record.metadata.rollback_to.clone(), None).await;
                for err in self.manifest_store.remove_stack_dirs(stack_id).await {
                    tracing::warn!(stack_id = %stack_id, %err, "best-effort manifest directory cleanup failed");
                }
                record.status = ObservedStatus::AwaitingRemovedStatus;
                self.write_back(&record);
            }
            Err(err) => {
                // No retry ceiling (§9 open question, decided in DESIGN.md):
                // the record stays `Removing` and is retried indefinitely.
                tracing::warn!(stack_id = %stack_id, %err, "remove failed, retrying indefinitely");
            }
        }
    }

    /// The status-observation transition table (`spec.md` §4.2).
    async fn reconcile_observation(&self, mut record: StackRecord) {
        let stack_id = record.id;
        let stack_name = stack_id.to_string();

        let (required, deadline) = match record.status {
            ObservedStatus::AwaitingDeployedStatus if record.metadata.edge_update_id.is_active() => {
                (DeployerStatus::Completed, STATUS_WAIT_DEADLINE)
            }
            ObservedStatus::AwaitingDeployedStatus => (DeployerStatus::Running, STATUS_WAIT_DEADLINE),
            ObservedStatus::Deployed => (DeployerStatus::Completed, DEPLOYED_PEEK_DEADLINE),
            ObservedStatus::AwaitingRemovedStatus => (DeployerStatus::Removed, STATUS_WAIT_DEADLINE),
            _ => return,
        };

        let outcome = match self.deployer.wait_for_status(&stack_name, required, deadline).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(stack_id = %stack_id, %err, "observation call failed, will retry next pass");
                return;
            }
        };

        // Kubernetes compatibility shim (§9): that variant degrades
        // `Completed` to `Running`, so a `Completed`-required wait must
        // accept `Running` as satisfying it.
        let observed = if outcome.status == DeployerStatus::Running
            && required == DeployerStatus::Completed
            && self.deployer.engine_type().degrades_completed_to_running()
        {
            DeployerStatus::Completed
        } else {
            outcome.status
        };

        match observed {
            DeployerStatus::Error if record.status == ObservedStatus::Deployed => {
                // Treated as "not yet completed", not a failure (§7).
            }
            DeployerStatus::Error => {
                self.fail(record, outcome.error_message.unwrap_or_else(|| "observation reported an error".to_string())).await;
            }
            DeployerStatus::Running => {
                record.status = ObservedStatus::Deployed;
                self.write_back(&record);
                self.status_reporter.report(stack_id, StatusKind::Running, record.metadata.rollback_to.clone(), None).await;
            }
            DeployerStatus::Completed => {
                record.status = ObservedStatus::Completed;
                self.write_back(&record);
                self.status_reporter.report(stack_id, StatusKind::Completed, record.metadata.rollback_to.clone(), None).await;
            }
            DeployerStatus::Removed => {
                if self.registry.remove_if_generation(stack_id, record.generation).is_none() {
                    tracing::debug!(stack_id = %stack_id, "skipped removal: intake rewrote the record during this pass");
                }
                self.status_reporter.report(stack_id, StatusKind::Removed, record.metadata.rollback_to.clone(), None).await;
            }
            DeployerStatus::Unknown => {
                // Any other observed status: no-op, keep observing.
            }
        }
    }

    /// Common terminal-`Error` path: set status, write back, report.
    async fn fail(&self, mut record: StackRecord, message: String) {
        let stack_id = record.id;
        tracing::error!(stack_id = %stack_id, error = %message, "stack transitioned to Error");
        record.status = ObservedStatus::Error;
        let rollback_to = record.metadata.rollback_to.clone();
        self.write_back(&record);
        self.status_reporter.report(stack_id, StatusKind::Error, rollback_to, Some(message)).await;
    }
}

#[cfg(test)]
#[path = "reconciler_tests.rs"]
mod tests;
