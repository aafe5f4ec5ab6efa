// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Process-level startup failures (`SPEC_FULL.md` §13). Distinct from
//! `esm_engine::IntakeError` and `esm_adapters::DeployerError`, which
//! are steady-state failures the reconciliation engine resolves into
//! record state (§7) rather than ever propagating up to here.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("invalid value for {var}: {value:?}")]
    BadConfig { var: &'static str, value: String },

    #[error("{var} is required but was not set")]
    MissingConfig { var: &'static str },

    #[error("failed to construct {engine_type} deployer: {source}")]
    DeployerInit {
        engine_type: esm_core::EngineType,
        #[source]
        source: esm_adapters::DeployerError,
    },

    #[error("initial control-plane poll failed: {0}")]
    InitialPoll(#[source] esm_wire::ControlPlaneError),
}
