// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test-only helpers shared across crates: `proptest` strategies for
//! the data model, gated behind the `test-support` feature so that
//! `esm-engine` and `esm-daemon` can use them in their own test suites
//! without pulling `proptest` into release builds.

use crate::action::Action;
use crate::id::{EdgeUpdateId, StackId, Version};
use crate::stack::{ManifestMetadata, StackFlags, StackRecord};
use crate::status::ObservedStatus;
use proptest::prelude::*;

/// A small, finite population of stack identities — enough to exercise
/// the scheduler's priority ordering and insertion-order guarantees
/// without proptest spending its budget on identity collisions.
pub fn arb_stack_id() -> impl Strategy<Value = StackId> {
    (1..64i64).prop_map(StackId::new)
}

pub fn arb_version() -> impl Strategy<Value = Version> {
    (1..1_000i64).prop_map(Version::new)
}

pub fn arb_edge_update_id() -> impl Strategy<Value = EdgeUpdateId> {
    prop_oneof![Just(EdgeUpdateId::NONE), (1..1_000i64).prop_map(EdgeUpdateId::new),]
}

pub fn arb_action() -> impl Strategy<Value = Action> {
    prop_oneof![Just(Action::Deploy), Just(Action::Update), Just(Action::Delete), Just(Action::Idle),]
}

pub fn arb_observed_status() -> impl Strategy<Value = ObservedStatus> {
    prop_oneof![
        Just(ObservedStatus::Pending),
        Just(ObservedStatus::Deploying),
        Just(ObservedStatus::Retry),
        Just(ObservedStatus::AwaitingDeployedStatus),
        Just(ObservedStatus::Deployed),
        Just(ObservedStatus::Completed),
        Just(ObservedStatus::Removing),
        Just(ObservedStatus::AwaitingRemovedStatus),
        Just(ObservedStatus::Error),
    ]
}

/// An arbitrary, internally-consistent stack record: counters bounded
/// by `MaxRetries`, flags independent of each other.
pub fn arb_stack_record() -> impl Strategy<Value = StackRecord> {
    (
        arb_stack_id(),
        arb_version(),
        arb_action(),
        arb_observed_status(),
        0..crate::constants::MAX_RETRIES,
        any::<bool>(),
        0..crate::constants::MAX_RETRIES,
        arb_edge_update_id(),
    )
        .prop_map(|(id, version, action, status, pull_count, pull_finished, deploy_count, edge_update_id)| {
            StackRecord {
                id,
                version,
                action,
                status,
                metadata: ManifestMetadata {
                    edge_update_id,
                    flags: StackFlags::default(),
                    ..ManifestMetadata::default()
                },
                pull_count,
                pull_finished,
                deploy_count,
                generation: 0,
            }
        })
}
