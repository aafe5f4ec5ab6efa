// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A scriptable, call-recording `Deployer` for use in other crates'
//! tests. Gated behind `test-support` so it never ships in a release
//! binary.

use crate::deployer::{DeployContext, Deployer, DeployerError, EngineType, WaitOutcome};
use async_trait::async_trait;
use esm_core::{DeployerStatus, ManifestFile};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// One recorded call against a [`FakeDeployer`], in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FakeCall {
    Validate(String),
    Pull(String),
    Deploy(String),
    Remove(String),
    WaitForStatus(String, DeployerStatus),
}

#[derive(Default)]
struct FakeDeployerState {
    calls: Vec<FakeCall>,
    validate_outcomes: VecDeque<Result<(), String>>,
    pull_outcomes: VecDeque<Result<(), String>>,
    deploy_outcomes: VecDeque<Result<(), String>>,
    remove_outcomes: VecDeque<Result<(), String>>,
    wait_outcomes: VecDeque<WaitOutcome>,
}

/// A `Deployer` whose every call outcome is pre-scripted by the test,
/// and whose calls are all recorded for later assertion.
///
/// Unscripted calls default to success (`Ok(())`, or
/// `WaitOutcome::ok(DeployerStatus::Unknown)` for observation) so that
/// tests only need to script the behavior they actually care about.
#[derive(Clone, Default)]
pub struct FakeDeployer {
    state: Arc<Mutex<FakeDeployerState>>,
    engine_type: EngineType,
}

impl FakeDeployer {
    pub fn new(engine_type: EngineType) -> Self {
        Self { state: Arc::new(Mutex::new(FakeDeployerState::default())), engine_type }
    }

    pub fn queue_validate(&self, outcome: Result<(), String>) {
        self.state.lock().validate_outcomes.push_back(outcome);
    }

    pub fn queue_pull(&self, outcome: Result<(), String>) {
        self.state.lock().pull_outcomes.push_back(outcome);
    }

    pub fn queue_deploy(&self, outcome: Result<(), String>) {
        self.state.lock().deploy_outcomes.push_back(outcome);
    }

    pub fn queue_remove(&self, outcome: Result<(), String>) {
        self.state.lock().remove_outcomes.push_back(outcome);
    }

    pub fn queue_wait(&self, outcome: WaitOutcome) {
        self.state.lock().wait_outcomes.push_back(outcome);
    }

    pub fn calls(&self) -> Vec<FakeCall> {
        self.state.lock().calls.clone()
    }

    pub fn call_count(&self, predicate: impl Fn(&FakeCall) -> bool) -> usize {
        self.state.lock().calls.iter().filter(|c| predicate(c)).count()
    }
}

fn to_deployer_error(stack_name: &str, message: String) -> DeployerError {
    DeployerError::Engine { stack_name: stack_name.to_string(), message }
}

#[async_trait]
impl Deployer for FakeDeployer {
    async fn validate(&self, stack_name: &str, _files: &[ManifestFile], _ctx: &DeployContext) -> Result<(), DeployerError> {
        let mut state = self.state.lock();
        state.calls.push(FakeCall::Validate(stack_name.to_string()));
        match state.validate_outcomes.pop_front() {
            Some(Ok(())) | None => Ok(()),
            Some(Err(message)) => Err(to_deployer_error(stack_name, message)),
        }
    }

    async fn pull(&self, stack_name: &str, _files: &[ManifestFile], _ctx: &DeployContext) -> Result<(), DeployerError> {
        let mut state = self.state.lock();
        state.calls.push(FakeCall::Pull(stack_name.to_string()));
        match state.pull_outcomes.pop_front() {
            Some(Ok(())) | None => Ok(()),
            Some(Err(message)) => Err(to_deployer_error(stack_name, message)),
        }
    }

    async fn deploy(&self, stack_name: &str, _files: &[ManifestFile], _ctx: &DeployContext) -> Result<(), DeployerError> {
        let mut state = self.state.lock();
        state.calls.push(FakeCall::Deploy(stack_name.to_string()));
        match state.deploy_outcomes.pop_front() {
            Some(Ok(())) | None => Ok(()),
            Some(Err(message)) => Err(to_deployer_error(stack_name, message)),
        }
    }

    async fn remove(&self, stack_name: &str, _files: &[ManifestFile], _ctx: &DeployContext) -> Result<(), DeployerError> {
        let mut state = self.state.lock();
        state.calls.push(FakeCall::Remove(stack_name.to_string()));
        match state.remove_outcomes.pop_front() {
            Some(Ok(())) | None => Ok(()),
            Some(Err(message)) => Err(to_deployer_error(stack_name, message)),
        }
    }

    async fn wait_for_status(
        &self,
        stack_name: &str,
        required: DeployerStatus,
        _deadline: Duration,
    ) -> Result<WaitOutcome, DeployerError> {
        let mut state = self.state.lock();
        state.calls.push(FakeCall::WaitForStatus(stack_name.to_string(), required));
        Ok(state.wait_outcomes.pop_front().unwrap_or(WaitOutcome { status: DeployerStatus::Unknown, error_message: None }))
    }

    fn engine_type(&self) -> EngineType {
        self.engine_type
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;
