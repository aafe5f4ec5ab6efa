// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Worker Loop (`spec.md` §4.4) plus the intake entry points it
//! shares the Registry with, bundled into one handle a daemon
//! constructs once per bound `EngineType` (`spec.md` §9:
//! "Polymorphism over engines" — a new engine type means a fresh
//! `Engine`, not a mutation of this one).

use crate::error::IntakeError;
use crate::intake::Intake;
use crate::reconciler::Reconciler;
use crate::scheduler::Scheduler;
use crate::sleeper::Sleeper;
use esm_core::{Registry, StackId, Version};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub struct Engine<S: Sleeper> {
    registry: Registry,
    scheduler: Scheduler<S>,
    reconciler: Arc<Reconciler>,
    intake: Arc<Intake>,
    ready: Arc<AtomicBool>,
    stopped: Arc<AtomicBool>,
}

impl<S: Sleeper> Engine<S> {
    pub fn new(registry: Registry, sleeper: S, reconciler: Reconciler, intake: Intake) -> Self {
        Self {
            scheduler: Scheduler::new(registry.clone(), sleeper),
            registry,
            reconciler: Arc::new(reconciler),
            intake: Arc::new(intake),
            ready: Arc::new(AtomicBool::new(false)),
            stopped: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// `spec.md` §4.5: merge a desired-state snapshot into the Registry.
    pub async fn poll(&self, desired: esm_wire::DesiredState) -> Result<(), IntakeError> {
        self.intake.poll(desired).await
    }

    /// `spec.md` §4.6: `DeployStack`.
    pub async fn deploy_stack(&self, id: StackId, version: Version, ready_re_pull_image: bool) -> Result<(), IntakeError> {
        self.intake.deploy_stack(id, version, ready_re_pull_image).await
    }

    /// `spec.md` §4.6: `DeleteStack`.
    pub async fn delete_stack(&self, id: StackId) -> Result<(), IntakeError> {
        self.intake.delete_stack(id).await
    }

    /// Whether the Worker Loop has completed at least one scheduling
    /// pass — a readiness signal for process supervisors, not part of
    /// the reconciliation semantics proper.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Signal the Worker Loop to exit after its current pass. In-flight
    /// external calls are allowed to complete (`spec.md` §5's
    /// cancellation rule) — this does not abort them.
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    /// The Worker Loop (`spec.md` §4.4): repeatedly ask the Scheduler
    /// for a record and reconcile it, until `stop()` is called.
    pub async fn run(&self) {
        loop {
            if self.stopped.load(Ordering::Acquire) {
                break;
            }

            if let Some(record) = self.scheduler.next().await {
                self.reconciler.reconcile(record).await;
            }

            self.ready.store(true, Ordering::Release);
        }
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
