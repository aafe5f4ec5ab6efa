// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the data model and registry themselves, as distinct
//! from errors surfaced by the external collaborators (`esm-adapters`,
//! `esm-wire`, `esm-storage` define their own error enums).

use crate::id::StackId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("stack {0} not found in registry")]
    NotFound(StackId),

    #[error("stack {id} entry file {entry:?} not present among manifest files")]
    EntryFileMissing { id: StackId, entry: String },

    #[error("stack {id} version regressed: current {current}, incoming {incoming}")]
    VersionRegression { id: StackId, current: i64, incoming: i64 },
}
