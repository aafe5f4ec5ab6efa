// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Tuning constants shared by the retry arithmetic and the scheduler.

use std::time::Duration;

/// Scheduler idle/observation polling granularity.
pub const IDLE_INTERVAL: Duration = Duration::from_secs(5);

/// `3600 / 5` — one retry per hour once the first hour of 5 s retries
/// has elapsed.
pub const PER_HOUR_RETRIES: u32 = 720;

/// One week of retries at the `PER_HOUR_RETRIES` cadence.
pub const MAX_RETRIES: u32 = PER_HOUR_RETRIES * 24 * 7;
