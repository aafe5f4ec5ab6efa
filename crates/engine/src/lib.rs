// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The reconciliation engine: a single-worker scheduler (`spec.md`
//! §4.3) driving a per-stack state machine (§4.2) over a shared
//! [`esm_core::Registry`], fed by poll and command intake (§4.5, §4.6)
//! and reporting status back to the control plane (§4.7).
//!
//! A daemon binds one [`Engine`] per `EngineType`, constructing it from
//! a bound [`esm_adapters::Deployer`] and [`esm_wire::ControlPlaneClient`].

mod engine;
mod error;
mod intake;
mod reconciler;
mod scheduler;
mod sleeper;
mod status_reporter;

pub use engine::Engine;
pub use error::IntakeError;
pub use intake::Intake;
pub use reconciler::Reconciler;
pub use scheduler::Scheduler;
pub use sleeper::{Sleeper, TokioSleeper};
pub use status_reporter::StatusReporter;

#[cfg(test)]
pub use sleeper::FakeSleeper;
