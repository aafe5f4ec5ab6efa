// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced across the `esm-engine` crate boundary.
//!
//! Per `spec.md` §7, only two error kinds are ever surfaced to an
//! intake caller — everything the Reconciler itself encounters is
//! absorbed into a record's state transition and a logged
//! `tracing::warn!`/`error!`, never propagated as a `Result`.

use esm_storage::StorageError;
use esm_wire::ControlPlaneError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    ControlPlane(#[from] ControlPlaneError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}
