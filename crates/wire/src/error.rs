// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors surfaced by the control-plane wire client (`spec.md` §6,
//! §7's "Control-plane report failure" / "Manifest fetch ... failure"
//! rows).

use esm_core::StackId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlPlaneError {
    #[error("control plane unreachable for stack {id}: {source}")]
    Transport { id: StackId, #[source] source: reqwest::Error },

    #[error("control plane returned {status} for stack {id}: {body}")]
    Status { id: StackId, status: u16, body: String },

    #[error("control plane response for stack {id} did not decode: {source}")]
    Decode { id: StackId, #[source] source: serde_json::Error },
}
