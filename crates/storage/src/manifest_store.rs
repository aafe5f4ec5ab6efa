// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Filesystem persistence of manifest directories (`spec.md` §3's
//! "Manifest Directory", §6's `ManifestStore` interface).
//!
//! Two on-disk trees per stack under a configured base directory:
//! `<base>/<stackID>/…` (live, used for deploy) and
//! `<base>/<stackID>-success/…` (mirrors the last successfully-deployed
//! manifest, used for delete so removal still works after the live
//! directory has been modified). A third, optional tree is
//! additionally materialized under `<filesystemPath>/<composePrefix>/<stackID>/`
//! when a stack's `SupportRelativePath` flag is set.

use crate::error::StorageError;
use esm_core::{ManifestFile, StackId};
use std::path::{Path, PathBuf};
use tokio::fs;

pub struct ManifestStore {
    base_dir: PathBuf,
}

impl ManifestStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self { base_dir: base_dir.into() }
    }

    pub fn live_dir(&self, id: StackId) -> PathBuf {
        self.base_dir.join(id.get().to_string())
    }

    pub fn success_dir(&self, id: StackId) -> PathBuf {
        self.base_dir.join(format!("{}-success", id.get()))
    }

    /// Decode every regular file under `dir` into a [`ManifestFile`],
    /// with `relative_path` relative to `dir`.
    pub async fn decode_dir_entries(&self, id: StackId, dir: &Path) -> Result<Vec<ManifestFile>, StorageError> {
        let mut files = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(current) = stack.pop() {
            let mut entries = match fs::read_dir(&current).await {
                Ok(entries) => entries,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
                Err(e) => return Err(io_err_id(id, current.display().to_string(), e)),
            };
            while let Some(entry) = entries.next_entry().await.map_err(|e| io_err_id(id, current.display().to_string(), e))? {
                let path = entry.path();
                let file_type = entry.file_type().await.map_err(|e| io_err_id(id, path.display().to_string(), e))?;
                if file_type.is_dir() {
                    stack.push(path);
                } else {
                    let contents = fs::read(&path).await.map_err(|e| io_err_id(id, path.display().to_string(), e))?;
                    let relative_path = path.strip_prefix(dir).unwrap_or(&path).to_string_lossy().replace('\\', "/");
                    files.push(ManifestFile { relative_path, contents });
                }
            }
        }
        Ok(files)
    }

    /// Persist `files` under `folder`, replacing anything already
    /// there.
    pub async fn persist_dir(&self, id: StackId, folder: &Path, files: &[ManifestFile]) -> Result<(), StorageError> {
        if folder.exists() {
            fs::remove_dir_all(folder).await.map_err(|e| io_err_id(id, folder.display().to_string(), e))?;
        }
        fs::create_dir_all(folder).await.map_err(|e| io_err_id(id, folder.display().to_string(), e))?;
        for file in files {
            let dest = folder.join(&file.relative_path);
            if let Some(parent) = dest.parent() {
                fs::create_dir_all(parent).await.map_err(|e| io_err_id(id, parent.display().to_string(), e))?;
            }
            fs::write(&dest, &file.contents).await.map_err(|e| io_err_id(id, dest.display().to_string(), e))?;
        }
        Ok(())
    }

    /// Mirror the live directory into the success directory on a
    /// successful deploy (§4.2 step 5's "snapshot the live manifest
    /// directory to the success directory").
    pub async fn snapshot_to_success(&self, id: StackId) -> Result<(), StorageError> {
        let live = self.live_dir(id);
        let success = self.success_dir(id);
        let files = self.decode_dir_entries(id, &live).await?;
        self.persist_dir(id, &success, &files).await
    }

    /// Copy the live manifest tree to the host-visible path for a
    /// `SupportRelativePath` stack (§6: "materialized under
    /// `<filesystemPath>/<composePrefix>/<stackID>/`").
    pub async fn copy_to_host(&self, filesystem_path: &Path, compose_prefix: &str, id: StackId) -> Result<(), StorageError> {
        let live = self.live_dir(id);
        let host_dir = filesystem_path.join(compose_prefix).join(id.get().to_string());
        let files = self.decode_dir_entries(id, &live).await?;
        self.persist_dir(id, &host_dir, &files).await
    }

    /// Remove the host-visible copy created by `copy_to_host`.
    /// Best-effort: a missing directory is not an error.
    pub async fn remove_from_host(&self, filesystem_path: &Path, compose_prefix: &str, id: StackId) -> Result<(), StorageError> {
        let host_dir = filesystem_path.join(compose_prefix).join(id.get().to_string());
        match fs::remove_dir_all(&host_dir).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_err_id(id, host_dir.display().to_string(), e)),
        }
    }

    /// Delete both the live and success directories for `id`.
    /// Best-effort: errors are collected, not short-circuited, so a
    /// stuck live directory doesn't block cleaning up success (§4.2
    /// step 3 of the Delete transition: "best-effort; errors logged,
    /// not fatal").
    pub async fn remove_stack_dirs(&self, id: StackId) -> Vec<StorageError> {
        let mut errors = Vec::new();
        for dir in [self.live_dir(id), self.success_dir(id)] {
            match fs::remove_dir_all(&dir).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => errors.push(io_err_id(id, dir.display().to_string(), e)),
            }
        }
        errors
    }
}

fn io_err_id(id: StackId, path: String, source: std::io::Error) -> StorageError {
    StorageError::Io { id, path, source }
}

#[cfg(test)]
#[path = "manifest_store_tests.rs"]
mod tests;
