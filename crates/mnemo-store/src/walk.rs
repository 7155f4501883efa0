// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Iterative directory walk with a depth guard.

use std::path::{Path, PathBuf};

use mnemo_core::MnemoError;
use tracing::warn;

/// Deepest level any walk descends to below its root.
pub const MAX_WALK_DEPTH: usize = 16;

/// A file found by [`walk_files`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
    pub path: PathBuf,
    /// Number of path components below the walk root (`a/b.md` is 2).
    pub depth: usize,
}

/// Files below `root` up to `max_depth` levels deep, sorted by path.
///
/// Symlinks are skipped. Directories beyond the guard are reported with
/// `warn!` and not entered. A missing root yields no files.
pub async fn walk_files(root: &Path, max_depth: usize) -> Result<Vec<WalkedFile>, MnemoError> {
    let max_depth = max_depth.min(MAX_WALK_DEPTH);
    let mut files = Vec::new();
    let mut stack: Vec<(PathBuf, usize)> = vec![(root.to_path_buf(), 0)];

    while let Some((dir, depth)) = stack.pop() {
        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(MnemoError::io(&dir, e)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MnemoError::io(&dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| MnemoError::io(&path, e))?;
            if file_type.is_symlink() {
                continue;
            }
            if file_type.is_dir() {
                if depth + 1 < max_depth {
                    stack.push((path, depth + 1));
                } else {
                    warn!(path = %path.display(), "directory exceeds walk depth, skipping");
                }
            } else if file_type.is_file() {
                files.push(WalkedFile {
                    path,
                    depth: depth + 1,
                });
            }
        }
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(files)
}

/// Immediate subdirectories of `dir`, sorted. Missing `dir` yields none.
pub async fn subdirectories(dir: &Path) -> Result<Vec<PathBuf>, MnemoError> {
    let mut out = Vec::new();
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(out),
        Err(e) => return Err(MnemoError::io(dir, e)),
    };
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| MnemoError::io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| MnemoError::io(entry.path(), e))?;
        if file_type.is_dir() {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}
