// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The stack registry (`spec.md` §4.1): the single source of truth for
//! observed state, one mutex covering the entire record set.
//!
//! `IndexMap` is used instead of a hash map so that "first in insertion
//! order" (§4.3's priority ordering, §9's starvation note) is a
//! well-defined, stable iteration order rather than an implementation
//! accident.

use crate::id::StackId;
use crate::stack::StackRecord;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::Arc;

/// In-memory map from stack identity to stack record, shared by clone
/// across the worker loop and every intake caller.
#[derive(Clone, Default)]
pub struct Registry {
    records: Arc<Mutex<IndexMap<StackId, StackRecord>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self { records: Arc::new(Mutex::new(IndexMap::new())) }
    }

    /// A shallow copy of the record for `id`, if present.
    ///
    /// Callers that will suspend (deployer calls, control-plane calls)
    /// must take this copy, release the mutex, and write back only the
    /// fields their action owns via [`Registry::upsert`] (§5 rule 2).
    pub fn lookup(&self, id: StackId) -> Option<StackRecord> {
        self.records.lock().get(&id).cloned()
    }

    /// Insert or replace the record for `record.id`.
    ///
    /// A first-time insert appends at the end of iteration order,
    /// giving it lowest priority among existing `Pending` records under
    /// the Scheduler's "first in insertion order" rule — a later
    /// `upsert` replacing an existing key does not move its position.
    pub fn upsert(&self, record: StackRecord) {
        self.records.lock().insert(record.id, record);
    }

    /// Remove the record for `id`, per §4.2's "a record is removed from
    /// the registry only upon observing the underlying workload as
    /// `Removed`".
    pub fn delete(&self, id: StackId) -> Option<StackRecord> {
        self.records.lock().shift_remove(&id)
    }

    /// The Worker Loop's write-back (§5 rule 2): merge only the fields
    /// `mutate` sets into the *current* stored record, but only if its
    /// `generation` still matches `expected_generation`.
    ///
    /// A mismatch means a poll or command intake rewrote this record
    /// (`reset_for_update`/`mark_for_delete`) while the worker's pass
    /// was suspended in a `Deployer`/control-plane call (§5, §9: intake
    /// is not serialized with in-flight external calls). The write-back
    /// is then dropped rather than clobbering the newer desired state —
    /// the next scheduling pass reconciles the record intake already
    /// rewrote (§5's ordering guarantee). Returns whether the merge was
    /// applied.
    pub fn merge_observed(&self, id: StackId, expected_generation: u64, mutate: impl FnOnce(&mut StackRecord)) -> bool {
        let mut guard = self.records.lock();
        match guard.get_mut(&id) {
            Some(current) if current.generation == expected_generation => {
                mutate(current);
                true
            }
            _ => false,
        }
    }

    /// Remove the record for `id`, but only if its `generation` still
    /// matches `expected_generation` (same race this guards against as
    /// [`Self::merge_observed`]) — a concurrent intake rewrite between
    /// the `Removed` observation and this call means there is new
    /// desired state to reconcile, not a stack to forget.
    pub fn remove_if_generation(&self, id: StackId, expected_generation: u64) -> Option<StackRecord> {
        let mut guard = self.records.lock();
        match guard.get(&id) {
            Some(current) if current.generation == expected_generation => guard.shift_remove(&id),
            _ => None,
        }
    }

    /// A shallow copy of the current record set, in insertion order —
    /// the Scheduler's only read path (§4.1, §4.3).
    pub fn snapshot(&self) -> Vec<StackRecord> {
        self.records.lock().values().cloned().collect()
    }

    /// Number of records currently tracked.
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    /// Run `f` against every record under a single critical section,
    /// replacing each with `f`'s return value. Used by Poll Intake's
    /// post-scan step (§4.5) to mark absent identities `Delete` inside
    /// the same atomic merge as the rest of the poll.
    pub fn retain_and_mutate(&self, mut f: impl FnMut(&mut StackRecord)) {
        let mut guard = self.records.lock();
        for record in guard.values_mut() {
            f(record);
        }
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
