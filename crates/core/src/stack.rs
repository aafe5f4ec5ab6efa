// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stack record (`spec.md` §3) and the engine-independent manifest
//! metadata it carries.

use crate::action::Action;
use crate::id::{EdgeUpdateId, RollbackTag, StackId, Version};
use crate::status::ObservedStatus;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// One decoded file in a stack's manifest tree, as handed to the
/// `Deployer` and round-tripped through `ManifestStore`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestFile {
    /// Path relative to the stack's manifest directory.
    pub relative_path: String,
    pub contents: Vec<u8>,
}

/// Registry credentials injected by `ManifestRewriter` into the entry
/// file of a stack's manifest (§6).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryCredentials {
    pub username: String,
    pub password: String,
    /// `None` means the default registry (Docker Hub / the cluster's
    /// configured registry).
    pub registry: Option<String>,
    /// Provider-injected pull tag (e.g. an ECR/GCR/ACR identifier) used
    /// in place of static `username`/`password` credentials (§6).
    pub cloud_registry: Option<String>,
}

/// The five independent flag bits a stack's manifest metadata carries
/// (§3).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFlags {
    pub pre_pull_image: bool,
    pub re_pull_image: bool,
    pub ready_re_pull_image: bool,
    pub retry_deploy: bool,
    pub support_relative_path: bool,
}

impl StackFlags {
    /// Whether this pass should attempt an image pull at all (§4.2
    /// step 2's guard).
    pub fn wants_pull(self) -> bool {
        self.pre_pull_image || self.re_pull_image || self.ready_re_pull_image
    }
}

/// Engine-independent manifest metadata (§3): everything about a
/// stack's deployment target and manifest handling that every
/// `Deployer` variant needs, regardless of engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ManifestMetadata {
    pub working_dir: PathBuf,
    pub entry_file: String,
    pub namespace: String,
    pub env: BTreeMap<String, String>,
    pub flags: StackFlags,
    pub registry_credentials: Option<RegistryCredentials>,
    pub rollback_to: RollbackTag,
    pub edge_update_id: EdgeUpdateId,
}

/// A stack's full record in the [`crate::registry::Registry`] (§3).
///
/// Copy-on-modify by convention (§5, §9): callers that may suspend take
/// a shallow `clone()` under the registry mutex, mutate the copy, and
/// write only the fields their action owns back under the mutex.
///
/// `generation` is bumped only by the intake-owned desired-state
/// mutators ([`StackRecord::fresh`] starts at `0`, [`StackRecord::reset_for_update`],
/// [`StackRecord::mark_for_delete`]) — never by the Reconciler. The
/// Registry's write-back merge compares against it to detect a
/// concurrent intake rewrite (§5 rule 2, §9's atomicity note) so a
/// stale worker pass never clobbers it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackRecord {
    pub id: StackId,
    pub version: Version,
    pub action: Action,
    pub status: ObservedStatus,
    pub metadata: ManifestMetadata,
    pub pull_count: u32,
    pub pull_finished: bool,
    pub deploy_count: u32,
    pub generation: u64,
}

crate::builder! {
    pub struct StackRecordBuilder => StackRecord {
        set {
            id: StackId = StackId::new(0),
            version: Version = Version::new(1),
            action: Action = Action::Deploy,
            status: ObservedStatus = ObservedStatus::Pending,
            metadata: ManifestMetadata = ManifestMetadata::default(),
            pull_count: u32 = 0,
            pull_finished: bool = false,
            deploy_count: u32 = 0,
            generation: u64 = 0,
        }
    }
}

impl StackRecord {
    /// A freshly-inserted record for a stack that Poll/Command Intake
    /// has not seen before (§4.5): `Action = Deploy`, `Status =
    /// Pending`, zeroed counters.
    pub fn fresh(id: StackId, version: Version, metadata: ManifestMetadata) -> Self {
        Self {
            id,
            version,
            action: Action::Deploy,
            status: ObservedStatus::Pending,
            metadata,
            pull_count: 0,
            pull_finished: false,
            deploy_count: 0,
            generation: 0,
        }
    }

    /// Reset the retry bookkeeping an `Update` transition clears
    /// (§4.5: "reset `PullCount=0`, `PullFinished=false`,
    /// `DeployCount=0`"), and bump `generation` so an in-flight worker
    /// pass over the pre-update record can no longer clobber this
    /// rewrite on write-back.
    pub fn reset_for_update(&mut self, version: Version) {
        self.action = Action::Update;
        self.status = ObservedStatus::Pending;
        self.version = version;
        self.pull_count = 0;
        self.pull_finished = false;
        self.deploy_count = 0;
        self.generation += 1;
    }

    /// Mark this record for removal (§4.5's post-scan step), preserving
    /// an in-flight removal already waiting on observation, and bump
    /// `generation` for the same reason as [`Self::reset_for_update`].
    pub fn mark_for_delete(&mut self) {
        self.action = Action::Delete;
        if self.status != ObservedStatus::AwaitingRemovedStatus {
            self.status = ObservedStatus::Pending;
        }
        self.generation += 1;
    }
}

#[cfg(test)]
#[path = "stack_tests.rs"]
mod tests;
