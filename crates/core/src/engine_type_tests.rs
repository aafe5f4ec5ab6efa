// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn only_kubernetes_degrades_completed_to_running() {
    assert!(EngineType::Kubernetes.degrades_completed_to_running());
    assert!(!EngineType::DockerStandalone.degrades_completed_to_running());
    assert!(!EngineType::DockerSwarm.degrades_completed_to_running());
    assert!(!EngineType::Nomad.degrades_completed_to_running());
}

#[test]
fn display_matches_wire_names() {
    assert_eq!(EngineType::DockerStandalone.to_string(), "DockerStandalone");
}
