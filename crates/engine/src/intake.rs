// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Poll Intake and Command Intake (`spec.md` §4.5, §4.6): merging a
//! desired-state snapshot, or a single imperative command, into the
//! Registry under one mutex-covered pass per identity's fetch.
//!
//! Both share [`Intake::merge_entry`] — the per-identity new/updated/
//! unchanged decision and its fetch-persist-rewrite side effects.
//! Only Poll Intake additionally runs the post-scan that marks every
//! identity absent from the snapshot for deletion; a command for one
//! stack must never mark every other tracked stack `Delete`.

use crate::error::IntakeError;
use crate::status_reporter::StatusReporter;
use esm_core::{Action, EngineType, ManifestMetadata, Registry, StackId, StackRecord, StatusKind, Version};
use esm_storage::{ManifestRewriter, ManifestStore};
use esm_wire::{ControlPlaneClient, DesiredStackEntry, DesiredState};
use std::sync::Arc;

pub struct Intake {
    registry: Registry,
    control_plane: Arc<dyn ControlPlaneClient>,
    manifest_store: Arc<ManifestStore>,
    status_reporter: StatusReporter,
    engine_type: EngineType,
}

impl Intake {
    pub fn new(
        registry: Registry,
        control_plane: Arc<dyn ControlPlaneClient>,
        manifest_store: Arc<ManifestStore>,
        status_reporter: StatusReporter,
        engine_type: EngineType,
    ) -> Self {
        Self { registry, control_plane, manifest_store, status_reporter, engine_type }
    }

    /// `spec.md` §4.5: merge a full desired-state snapshot, then mark
    /// every tracked identity absent from it for deletion.
    pub async fn poll(&self, desired: DesiredState) -> Result<(), IntakeError> {
        for (id, entry) in &desired {
            self.merge_entry(*id, entry).await?;
        }

        self.registry.retain_and_mutate(|record| {
            if !desired.contains_key(&record.id) {
                record.mark_for_delete();
            }
        });

        Ok(())
    }

    /// `spec.md` §4.6: `DeployStack(payload)`, equivalent to a
    /// one-entry poll, without the absent-identities post-scan.
    pub async fn deploy_stack(&self, id: StackId, version: Version, ready_re_pull_image: bool) -> Result<(), IntakeError> {
        let entry = DesiredStackEntry { version, ready_re_pull_image };
        self.merge_entry(id, &entry).await
    }

    /// `spec.md` §4.6: `DeleteStack(payload)` — mark one identity for
    /// removal without touching any other record or requiring a fresh
    /// manifest fetch (there is nothing left to converge to).
    pub async fn delete_stack(&self, id: StackId) -> Result<(), IntakeError> {
        if let Some(mut record) = self.registry.lookup(id) {
            record.mark_for_delete();
            self.registry.upsert(record);
        }
        Ok(())
    }

    async fn merge_entry(&self, id: StackId, entry: &DesiredStackEntry) -> Result<(), IntakeError> {
        match self.registry.lookup(id) {
            None => {
                let payload = self.fetch_persist_rewrite(id, entry.version, Action::Deploy).await?;
                let metadata = self.metadata_from_payload(id, &payload);
                let mut record = StackRecord::fresh(id, entry.version, metadata);
                record.metadata.flags.ready_re_pull_image = entry.ready_re_pull_image;
                self.registry.upsert(record);
                self.status_reporter.report(id, StatusKind::Acknowledged, payload.rollback_to, None).await;
            }
            Some(record) if entry.version > record.version || (entry.ready_re_pull_image && !record.metadata.flags.ready_re_pull_image) => {
                let payload = self.fetch_persist_rewrite(id, entry.version, Action::Update).await?;
                let metadata = self.metadata_from_payload(id, &payload);
                let mut updated = record;
                updated.reset_for_update(entry.version);
                updated.metadata = metadata;
                updated.metadata.flags.ready_re_pull_image = entry.ready_re_pull_image;
                self.registry.upsert(updated);
                self.status_reporter.report(id, StatusKind::Acknowledged, payload.rollback_to, None).await;
            }
            Some(_) => {}
        }
        Ok(())
    }

    async fn fetch_persist_rewrite(&self, id: StackId, version: Version, action: Action) -> Result<esm_wire::StackPayload, IntakeError> {
        let mut payload = self.control_plane.get_edge_stack_config(id, version).await?;
        let update_active = action == Action::Update;
        ManifestRewriter::rewrite(
            id,
            self.engine_type,
            &mut payload.files,
            &payload.entry_file,
            payload.registry_credentials.as_ref(),
            update_active,
        )?;
        let live_dir = self.manifest_store.live_dir(id);
        self.manifest_store.persist_dir(id, &live_dir, &payload.files).await?;
        Ok(payload)
    }

    fn metadata_from_payload(&self, id: StackId, payload: &esm_wire::StackPayload) -> ManifestMetadata {
        ManifestMetadata {
            working_dir: self.manifest_store.live_dir(id),
            entry_file: payload.entry_file.clone(),
            namespace: payload.namespace.clone(),
            env: payload.env.clone(),
            flags: payload.flags,
            registry_credentials: payload.registry_credentials.clone(),
            rollback_to: payload.rollback_to.clone(),
            edge_update_id: payload.edge_update_id,
        }
    }
}

#[cfg(test)]
#[path = "intake_tests.rs"]
mod tests;
