// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::action::Action;
use crate::status::ObservedStatus;

#[test]
fn lookup_returns_none_for_absent_identity() {
    let reg = Registry::new();
    assert!(reg.lookup(StackId::new(1)).is_none());
}

#[test]
fn upsert_then_lookup_roundtrips() {
    let reg = Registry::new();
    let rec = StackRecord::builder().id(StackId::new(7)).build();
    reg.upsert(rec.clone());
    let found = reg.lookup(StackId::new(7)).unwrap();
    assert_eq!(found.id, rec.id);
}

#[test]
fn delete_removes_and_returns_record() {
    let reg = Registry::new();
    reg.upsert(StackRecord::builder().id(StackId::new(3)).build());
    let removed = reg.delete(StackId::new(3));
    assert!(removed.is_some());
    assert!(reg.lookup(StackId::new(3)).is_none());
    assert!(reg.delete(StackId::new(3)).is_none());
}

#[test]
fn snapshot_preserves_insertion_order() {
    let reg = Registry::new();
    reg.upsert(StackRecord::builder().id(StackId::new(3)).build());
    reg.upsert(StackRecord::builder().id(StackId::new(1)).build());
    reg.upsert(StackRecord::builder().id(StackId::new(2)).build());
    let ids: Vec<_> = reg.snapshot().into_iter().map(|r| r.id.get()).collect();
    assert_eq!(ids, vec![3, 1, 2]);
}

#[test]
fn replacing_existing_key_does_not_move_its_position() {
    let reg = Registry::new();
    reg.upsert(StackRecord::builder().id(StackId::new(1)).build());
    reg.upsert(StackRecord::builder().id(StackId::new(2)).build());
    reg.upsert(StackRecord::builder().id(StackId::new(1)).status(ObservedStatus::Deployed).build());
    let ids: Vec<_> = reg.snapshot().into_iter().map(|r| r.id.get()).collect();
    assert_eq!(ids, vec![1, 2]);
}

#[test]
fn retain_and_mutate_applies_to_every_record_under_one_lock() {
    let reg = Registry::new();
    reg.upsert(StackRecord::builder().id(StackId::new(1)).build());
    reg.upsert(StackRecord::builder().id(StackId::new(2)).build());
    reg.retain_and_mutate(|r| r.action = Action::Delete);
    assert!(reg.snapshot().iter().all(|r| r.action == Action::Delete));
}

#[test]
fn merge_observed_applies_when_generation_matches() {
    let reg = Registry::new();
    reg.upsert(StackRecord::builder().id(StackId::new(5)).generation(0).build());
    let applied = reg.merge_observed(StackId::new(5), 0, |r| r.status = ObservedStatus::Deployed);
    assert!(applied);
    assert_eq!(reg.lookup(StackId::new(5)).unwrap().status, ObservedStatus::Deployed);
}

#[test]
fn merge_observed_is_dropped_when_generation_has_moved_on() {
    let reg = Registry::new();
    reg.upsert(StackRecord::builder().id(StackId::new(6)).generation(0).build());
    // Simulate a concurrent intake rewrite bumping the generation.
    reg.merge_observed(StackId::new(6), 0, |r| r.generation = 1);

    let applied = reg.merge_observed(StackId::new(6), 0, |r| r.status = ObservedStatus::Error);
    assert!(!applied);
    assert_eq!(reg.lookup(StackId::new(6)).unwrap().status, ObservedStatus::Pending);
}

#[test]
fn merge_observed_is_a_noop_for_an_absent_identity() {
    let reg = Registry::new();
    assert!(!reg.merge_observed(StackId::new(9), 0, |r| r.status = ObservedStatus::Error));
}

#[test]
fn remove_if_generation_removes_only_on_match() {
    let reg = Registry::new();
    reg.upsert(StackRecord::builder().id(StackId::new(4)).generation(0).build());

    assert!(reg.remove_if_generation(StackId::new(4), 1).is_none());
    assert!(reg.lookup(StackId::new(4)).is_some());

    assert!(reg.remove_if_generation(StackId::new(4), 0).is_some());
    assert!(reg.lookup(StackId::new(4)).is_none());
}

#[test]
fn len_and_is_empty_reflect_record_count() {
    let reg = Registry::new();
    assert!(reg.is_empty());
    reg.upsert(StackRecord::builder().id(StackId::new(1)).build());
    assert_eq!(reg.len(), 1);
    assert!(!reg.is_empty());
}
