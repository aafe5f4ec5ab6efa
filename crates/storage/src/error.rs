// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use esm_core::StackId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error for stack {id} at {path}: {source}")]
    Io { id: StackId, path: String, #[source] source: std::io::Error },

    #[error("stack {id} entry file {entry:?} not present among manifest files")]
    EntryFileMissing { id: StackId, entry: String },

    #[error("stack {id} entry file {entry:?} could not be rewritten: {message}")]
    RewriteFailed { id: StackId, entry: String, message: String },
}
