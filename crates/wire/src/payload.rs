// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The over-the-wire shape of a stack's full configuration
//! (`ControlPlaneClient::GetEdgeStackConfig`, `spec.md` §6) and of a
//! poll's desired-state snapshot (`spec.md` §4.5).

use esm_core::{EdgeUpdateId, ManifestFile, RegistryCredentials, RollbackTag, StackFlags, StackId, Version};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One entry in a poll's desired-state snapshot (`spec.md` §4.5):
/// everything Poll Intake needs to decide whether a record is new,
/// updated, or unchanged, without yet fetching the full manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredStackEntry {
    pub version: Version,
    #[serde(default)]
    pub ready_re_pull_image: bool,
}

/// A full poll response: the complete desired set of stacks, keyed by
/// identity.
pub type DesiredState = BTreeMap<StackId, DesiredStackEntry>;

/// The full manifest and metadata for one stack
/// (`ControlPlaneClient::GetEdgeStackConfig`, `spec.md` §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StackPayload {
    pub id: StackId,
    pub version: Version,
    pub namespace: String,
    pub entry_file: String,
    pub env: BTreeMap<String, String>,
    pub flags: StackFlags,
    pub registry_credentials: Option<RegistryCredentials>,
    pub rollback_to: RollbackTag,
    pub edge_update_id: EdgeUpdateId,
    pub files: Vec<ManifestFile>,
}

#[cfg(test)]
#[path = "payload_tests.rs"]
mod tests;
