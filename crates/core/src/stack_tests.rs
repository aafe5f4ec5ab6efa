// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn flags_want_pull_when_any_pull_bit_set() {
    let mut flags = StackFlags::default();
    assert!(!flags.wants_pull());
    flags.re_pull_image = true;
    assert!(flags.wants_pull());
}

#[test]
fn fresh_record_starts_pending_deploy_zeroed() {
    let rec = StackRecord::fresh(StackId::new(42), Version::new(1), ManifestMetadata::default());
    assert_eq!(rec.action, Action::Deploy);
    assert_eq!(rec.status, ObservedStatus::Pending);
    assert_eq!(rec.pull_count, 0);
    assert!(!rec.pull_finished);
    assert_eq!(rec.deploy_count, 0);
    assert_eq!(rec.generation, 0);
}

#[test]
fn reset_for_update_clears_counters_and_bumps_version() {
    let mut rec = StackRecord::builder()
        .id(StackId::new(1))
        .version(Version::new(1))
        .pull_count(5)
        .pull_finished(true)
        .deploy_count(3)
        .status(ObservedStatus::Deployed)
        .generation(4)
        .build();

    rec.reset_for_update(Version::new(2));

    assert_eq!(rec.action, Action::Update);
    assert_eq!(rec.status, ObservedStatus::Pending);
    assert_eq!(rec.version, Version::new(2));
    assert_eq!(rec.pull_count, 0);
    assert!(!rec.pull_finished);
    assert_eq!(rec.deploy_count, 0);
    assert_eq!(rec.generation, 5);
}

#[test]
fn reset_for_update_bumps_generation_even_when_version_is_unchanged() {
    // §4.5: a `ReadyRePullImage` toggle with no version bump still
    // rewrites the record and must invalidate an in-flight worker pass.
    let mut rec = StackRecord::builder().version(Version::new(3)).generation(0).build();
    rec.reset_for_update(Version::new(3));
    assert_eq!(rec.version, Version::new(3));
    assert_eq!(rec.generation, 1);
}

#[test]
fn mark_for_delete_preserves_in_flight_removal() {
    let mut rec = StackRecord::builder().status(ObservedStatus::AwaitingRemovedStatus).generation(2).build();
    rec.mark_for_delete();
    assert_eq!(rec.action, Action::Delete);
    assert_eq!(rec.status, ObservedStatus::AwaitingRemovedStatus);
    assert_eq!(rec.generation, 3);

    let mut rec2 = StackRecord::builder().status(ObservedStatus::Deployed).build();
    rec2.mark_for_delete();
    assert_eq!(rec2.action, Action::Delete);
    assert_eq!(rec2.status, ObservedStatus::Pending);
    assert_eq!(rec2.generation, 1);
}
