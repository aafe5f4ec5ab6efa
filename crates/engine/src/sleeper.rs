// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Scheduler's idle-interval sleep (`spec.md` §4.3 rules 2 and 4),
//! abstracted behind a trait so tests never wait on real wall-clock
//! time — the same testability goal `esm_core::Clock` serves for the
//! retry/backoff arithmetic, but async and specific to the one place
//! this crate actually suspends on a timer.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

#[async_trait]
pub trait Sleeper: Clone + Send + Sync + 'static {
    async fn sleep(&self, duration: Duration);
}

/// Real sleeping, backed by the tokio timer wheel.
#[derive(Clone, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Records every requested sleep instead of waiting, so scheduler and
/// worker-loop tests run instantly while still asserting the right
/// sleep/no-sleep decision was made.
#[derive(Clone, Default)]
pub struct FakeSleeper {
    calls: Arc<Mutex<Vec<Duration>>>,
}

impl FakeSleeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<Duration> {
        self.calls.lock().clone()
    }

    pub fn sleep_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl Sleeper for FakeSleeper {
    async fn sleep(&self, duration: Duration) {
        self.calls.lock().push(duration);
    }
}

#[cfg(test)]
#[path = "sleeper_tests.rs"]
mod tests;
