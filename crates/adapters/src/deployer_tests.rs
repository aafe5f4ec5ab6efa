// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn wait_outcome_ok_carries_no_error_message() {
    let outcome = WaitOutcome::ok(DeployerStatus::Running);
    assert_eq!(outcome.status, DeployerStatus::Running);
    assert!(outcome.error_message.is_none());
}

#[test]
fn wait_outcome_error_sets_status_error() {
    let outcome = WaitOutcome::error("boom");
    assert_eq!(outcome.status, DeployerStatus::Error);
    assert_eq!(outcome.error_message.as_deref(), Some("boom"));
}

#[test]
fn engine_type_display_matches_wire_names() {
    assert_eq!(EngineType::DockerStandalone.to_string(), "DockerStandalone");
    assert_eq!(EngineType::Kubernetes.to_string(), "Kubernetes");
}
