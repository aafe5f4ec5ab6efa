// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The periodic poll-loop driver (`SPEC_FULL.md` §15): the ambient
//! "something must call Poll Intake" wiring `spec.md` deliberately
//! leaves to the out-of-scope `ControlPlaneClient` collaborator. This
//! is not new reconciliation semantics — it just turns a cadence into
//! repeated calls to `Engine::poll`.

use esm_engine::{Engine, Sleeper};
use esm_wire::ControlPlaneClient;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fetch the control plane's desired-state snapshot every
/// `poll_interval` and feed it into `engine.poll()`, until `stop` is
/// set. Fetch/decode failures are logged (`spec.md` §7: "no record
/// mutation committed") and retried on the next tick.
pub async fn run<S: Sleeper>(
    engine: Arc<Engine<S>>,
    control_plane: Arc<dyn ControlPlaneClient>,
    poll_interval: Duration,
    stop: Arc<AtomicBool>,
) {
    loop {
        if stop.load(Ordering::Acquire) {
            return;
        }

        match control_plane.poll_desired_state().await {
            Ok(desired) => {
                if let Err(err) = engine.poll(desired).await {
                    tracing::warn!(error = %err, "poll intake failed; will retry next tick");
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to fetch desired state from control plane");
            }
        }

        tokio::time::sleep(poll_interval).await;
    }
}

#[cfg(test)]
#[path = "poll_loop_tests.rs"]
mod tests;
