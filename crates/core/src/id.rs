// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stack identity and version, plus the opaque tags the control plane
//! attaches to a stack (`RollbackTo`, `EdgeUpdateID`).
//!
//! Unlike the generated IDs elsewhere in this lineage of daemons, stack
//! identity here is the control plane's own stable integer — there is
//! nothing to generate locally.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Define a newtype ID wrapper around a control-plane-assigned `i64`.
///
/// Generates `new()`, `get()`, `Display`, `From<i64>`, ordering, and
/// (de)serialization as a bare integer on the wire.
macro_rules! define_int_id {
    (
        $(#[$meta:meta])*
        pub struct $name:ident;
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub const fn new(v: i64) -> Self {
                Self(v)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(v: i64) -> Self {
                Self(v)
            }
        }
    };
}

define_int_id! {
    /// Stable integer identity of a stack, assigned by the control plane.
    /// Stable across versions.
    pub struct StackId;
}

define_int_id! {
    /// Monotonically-increasing version of a stack's desired configuration.
    pub struct Version;
}

define_int_id! {
    /// Opaque marker of a one-shot update. `0` means "not a one-shot
    /// update" — see [`EdgeUpdateId::is_active`].
    pub struct EdgeUpdateId;
}

impl EdgeUpdateId {
    /// The sentinel meaning "this stack is not a one-shot updater".
    pub const NONE: EdgeUpdateId = EdgeUpdateId(0);

    /// Whether this tag marks the stack as a one-shot update
    /// (`EdgeUpdateID ≠ 0` in `spec.md` §4.2).
    pub fn is_active(self) -> bool {
        self.0 != 0
    }
}

impl Default for EdgeUpdateId {
    fn default() -> Self {
        Self::NONE
    }
}

/// Opaque caller-supplied rollback identifier, forwarded verbatim in
/// status updates and never otherwise interpreted by this crate (the
/// Non-goal in `spec.md` §1: "rollback orchestration beyond forwarding
/// a caller-supplied rollback identifier").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollbackTag(pub Option<String>);

impl RollbackTag {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl From<&str> for RollbackTag {
    fn from(s: &str) -> Self {
        Self(Some(s.to_string()))
    }
}

impl From<String> for RollbackTag {
    fn from(s: String) -> Self {
        Self(Some(s))
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
