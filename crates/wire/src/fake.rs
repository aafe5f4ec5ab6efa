// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A scriptable, call-recording [`ControlPlaneClient`] for use in
//! other crates' tests. Gated behind `test-support` so it never ships
//! in a release binary, mirroring `esm-adapters::FakeDeployer`.

use crate::client::{ControlPlaneClient, StatusReport};
use crate::error::ControlPlaneError;
use crate::payload::{DesiredState, StackPayload};
use async_trait::async_trait;
use esm_core::{StackId, Version};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(Default)]
struct FakeState {
    configs: std::collections::HashMap<StackId, StackPayload>,
    config_errors: VecDeque<ControlPlaneError>,
    reports: Vec<StatusReport>,
    report_errors: VecDeque<ControlPlaneError>,
    desired_state: DesiredState,
}

/// A `ControlPlaneClient` whose manifest fetches are a fixed map and
/// whose status reports are recorded for later assertion.
#[derive(Clone, Default)]
pub struct FakeControlPlaneClient {
    state: Arc<Mutex<FakeState>>,
}

impl FakeControlPlaneClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_config(&self, payload: StackPayload) {
        self.state.lock().configs.insert(payload.id, payload);
    }

    pub fn queue_config_error(&self, error: ControlPlaneError) {
        self.state.lock().config_errors.push_back(error);
    }

    pub fn queue_report_error(&self, error: ControlPlaneError) {
        self.state.lock().report_errors.push_back(error);
    }

    pub fn set_desired_state(&self, desired: DesiredState) {
        self.state.lock().desired_state = desired;
    }

    pub fn reports(&self) -> Vec<StatusReport> {
        self.state.lock().reports.clone()
    }
}

#[async_trait]
impl ControlPlaneClient for FakeControlPlaneClient {
    async fn get_edge_stack_config(&self, id: StackId, _version: Version) -> Result<StackPayload, ControlPlaneError> {
        let mut state = self.state.lock();
        if let Some(error) = state.config_errors.pop_front() {
            return Err(error);
        }
        state
            .configs
            .get(&id)
            .cloned()
            .ok_or(ControlPlaneError::Status { id, status: 404, body: "no fake config set".to_string() })
    }

    async fn set_edge_stack_status(&self, report: StatusReport) -> Result<(), ControlPlaneError> {
        let mut state = self.state.lock();
        if let Some(error) = state.report_errors.pop_front() {
            return Err(error);
        }
        state.reports.push(report);
        Ok(())
    }

    async fn poll_desired_state(&self) -> Result<DesiredState, ControlPlaneError> {
        Ok(self.state.lock().desired_state.clone())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
