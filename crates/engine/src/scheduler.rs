// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The single-worker scheduler (`spec.md` §4.3): picks at most one
//! record per call under a fixed priority ordering over the Registry
//! snapshot, idling when nothing is actionable.

use crate::sleeper::Sleeper;
use esm_core::{ObservedStatus, Registry, StackRecord, IDLE_INTERVAL};

pub struct Scheduler<S: Sleeper> {
    registry: Registry,
    sleeper: S,
}

impl<S: Sleeper> Scheduler<S> {
    pub fn new(registry: Registry, sleeper: S) -> Self {
        Self { registry, sleeper }
    }

    /// Select the next record to act on, or sleep and return `None` if
    /// there is nothing actionable this pass.
    ///
    /// Rule order (§4.3, all five rules verbatim):
    /// 1. First `Pending` record, in insertion order — return
    ///    immediately, no sleep. This must strictly dominate rules 2
    ///    and 4 so a `Pending` record is never starved by repeated
    ///    observation cycles (§9's starvation note).
    /// 2. First `AwaitingDeployedStatus`/`AwaitingRemovedStatus` record
    ///    — sleep the idle interval, then return it.
    /// 3. No record actionable by (1)/(2): re-elevate every `Retry`
    ///    record to `Pending` (side effect only) and return `None`
    ///    without sleeping, so the *next* call finds them under rule
    ///    1 — "loop back to (1) on the next call" (§4.3).
    /// 4. First `Deployed` record (one-shot completion check) — sleep
    ///    the idle interval, then return it.
    /// 5. Nothing at all: sleep the idle interval, return `None`.
    pub async fn next(&self) -> Option<StackRecord> {
        let snapshot = self.registry.snapshot();

        if let Some(record) = snapshot.iter().find(|r| r.status == ObservedStatus::Pending) {
            return Some(record.clone());
        }

        if let Some(record) = snapshot
            .iter()
            .find(|r| matches!(r.status, ObservedStatus::AwaitingDeployedStatus | ObservedStatus::AwaitingRemovedStatus))
        {
            self.sleeper.sleep(IDLE_INTERVAL).await;
            return Some(record.clone());
        }

        if snapshot.iter().any(|r| r.status == ObservedStatus::Retry) {
            self.registry.retain_and_mutate(|record| {
                if record.status == ObservedStatus::Retry {
                    record.status = ObservedStatus::Pending;
                }
            });
            return None;
        }

        if let Some(record) = snapshot.iter().find(|r| r.status == ObservedStatus::Deployed) {
            self.sleeper.sleep(IDLE_INTERVAL).await;
            return Some(record.clone());
        }

        self.sleeper.sleep(IDLE_INTERVAL).await;
        None
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
