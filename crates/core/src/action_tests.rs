// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn deploy_and_update_are_deploy_family() {
    assert!(Action::Deploy.is_deploy_family());
    assert!(Action::Update.is_deploy_family());
    assert!(!Action::Delete.is_deploy_family());
    assert!(!Action::Idle.is_deploy_family());
}

#[test]
fn display_matches_wire_names() {
    assert_eq!(Action::Update.to_string(), "Update");
}
