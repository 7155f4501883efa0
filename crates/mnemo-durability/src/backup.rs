// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Directory snapshots of `tasks/` and `memories/`.
//!
//! A backup lives in `<backup_dir>/<YYYYmmddTHHMMSSfffZ>_<label>/` and holds
//! copies of both trees plus a `manifest.json`. Names sort chronologically.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use mnemo_config::MnemoConfig;
use mnemo_core::{EntityKind, MnemoError, sanitize_file_stem};
use mnemo_store::layout::{ENTITY_EXT, is_temp_file, kind_dir};
use mnemo_store::{EntityStore, MAX_WALK_DEPTH, write_atomic};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

pub const MANIFEST_FILE: &str = "manifest.json";

/// Label of the safety backup taken before a restore.
pub const PRE_RESTORE_LABEL: &str = "pre-restore";

const TIMESTAMP_FORMAT: &str = "%Y%m%dT%H%M%S%3fZ";

/// Which trees a backup holds.
///
/// The counts are informational; manifests written without them read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestContents {
    pub tasks: bool,
    pub memories: bool,
    #[serde(default)]
    pub task_count: usize,
    #[serde(default)]
    pub memory_count: usize,
}

impl ManifestContents {
    pub fn includes(&self, kind: EntityKind) -> bool {
        match kind {
            EntityKind::Task => self.tasks,
            EntityKind::Memory => self.memories,
        }
    }
}

/// Entity files copied by a restore.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub tasks: usize,
    pub memories: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    pub timestamp: DateTime<Utc>,
    /// The label the backup was taken under, e.g. `manual` or `pre-restore`.
    pub operation: String,
    pub contents: ManifestContents,
}

/// A backup on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupHandle {
    pub path: PathBuf,
    pub manifest: BackupManifest,
}

/// Outcome of [`Durability::restore`].
#[derive(Debug, Clone, Serialize)]
pub struct RestoreReport {
    /// Snapshot of the live trees taken before they were replaced.
    pub pre_restore: BackupHandle,
    pub restored: EntityCounts,
}

/// Backup, restore, health check and orphan cleanup over one storage root.
#[derive(Debug, Clone)]
pub struct Durability {
    pub(crate) store: EntityStore,
    backup_dir: PathBuf,
    keep_backups: usize,
}

impl Durability {
    pub fn new(store: EntityStore, backup_dir: impl Into<PathBuf>, keep_backups: usize) -> Self {
        Self {
            store,
            backup_dir: backup_dir.into(),
            keep_backups,
        }
    }

    pub fn from_config(store: EntityStore, config: &MnemoConfig) -> Self {
        Self::new(store, config.backup_dir(), config.durability.keep_backups)
    }

    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Copies both entity trees into a new timestamped directory.
    pub async fn backup(&self, label: &str) -> Result<BackupHandle, MnemoError> {
        let label = sanitize_file_stem(label);
        let timestamp = Utc::now();
        let path = self.reserve_dir(&timestamp, &label).await?;

        let mut contents = ManifestContents::default();
        for kind in [EntityKind::Task, EntityKind::Memory] {
            let source = kind_dir(self.store.root(), kind);
            let target = kind_dir(&path, kind);
            let entities = copy_tree(&source, &target).await?;
            match kind {
                EntityKind::Task => {
                    contents.tasks = true;
                    contents.task_count = entities;
                }
                EntityKind::Memory => {
                    contents.memories = true;
                    contents.memory_count = entities;
                }
            }
        }

        let manifest = BackupManifest {
            timestamp,
            operation: label,
            contents,
        };
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| MnemoError::Internal(format!("cannot encode backup manifest: {e}")))?;
        write_atomic(&path.join(MANIFEST_FILE), &json).await?;

        info!(
            path = %path.display(),
            tasks = contents.task_count,
            memories = contents.memory_count,
            "backup complete"
        );
        Ok(BackupHandle { path, manifest })
    }

    /// Opens the backup at `path`, checking its manifest.
    pub async fn open_backup(&self, path: &Path) -> Result<BackupHandle, MnemoError> {
        let manifest_path = path.join(MANIFEST_FILE);
        let text = tokio::fs::read_to_string(&manifest_path)
            .await
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound => MnemoError::Validation(format!(
                    "{} is not a backup (no {MANIFEST_FILE})",
                    path.display()
                )),
                _ => MnemoError::io(&manifest_path, e),
            })?;
        let manifest = serde_json::from_str(&text).map_err(|e| MnemoError::Corrupt {
            path: manifest_path.clone(),
            reason: e.to_string(),
        })?;
        Ok(BackupHandle {
            path: path.to_path_buf(),
            manifest,
        })
    }

    /// Replaces the live trees with the backup's, after a safety backup.
    ///
    /// Trees the manifest does not list are left as they are. Each tree is copied to a staging directory first and swapped in by
    /// rename, so a failed copy leaves the live tree untouched.
    pub async fn restore(&self, handle: &BackupHandle) -> Result<RestoreReport, MnemoError> {
        let handle = self.open_backup(&handle.path).await?;
        let pre_restore = self.backup(PRE_RESTORE_LABEL).await?;

        let mut restored = EntityCounts::default();
        for kind in [EntityKind::Task, EntityKind::Memory] {
            if !handle.manifest.contents.includes(kind) {
                debug!(%kind, "backup does not hold this tree, keeping live copy");
                continue;
            }
            let live = kind_dir(self.store.root(), kind);
            let staging = self.store.root().join(format!(".{kind}.restoring"));
            remove_dir_if_exists(&staging).await?;

            let entities = copy_tree(&kind_dir(&handle.path, kind), &staging).await?;
            remove_dir_if_exists(&live).await?;
            tokio::fs::rename(&staging, &live)
                .await
                .map_err(|e| MnemoError::io(&live, e))?;
            match kind {
                EntityKind::Task => restored.tasks = entities,
                EntityKind::Memory => restored.memories = entities,
            }
        }

        info!(
            from = %handle.path.display(),
            safety = %pre_restore.path.display(),
            tasks = restored.tasks,
            memories = restored.memories,
            "restore complete"
        );
        Ok(RestoreReport {
            pre_restore,
            restored,
        })
    }

    /// Backups with a readable manifest, oldest first.
    pub async fn list_backups(&self) -> Result<Vec<BackupHandle>, MnemoError> {
        let mut entries = match tokio::fs::read_dir(&self.backup_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(MnemoError::io(&self.backup_dir, e)),
        };

        let mut dirs = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MnemoError::io(&self.backup_dir, e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| MnemoError::io(entry.path(), e))?
                .is_dir();
            if is_dir {
                dirs.push(entry.path());
            }
        }
        dirs.sort();

        let mut backups = Vec::with_capacity(dirs.len());
        for dir in dirs {
            match self.open_backup(&dir).await {
                Ok(handle) => backups.push(handle),
                Err(e) => warn!(path = %dir.display(), error = %e, "ignoring unreadable backup"),
            }
        }
        Ok(backups)
    }

    /// Deletes all but the newest `keep` backups. Returns the removed paths.
    pub async fn prune_backups(&self, keep: usize) -> Result<Vec<PathBuf>, MnemoError> {
        let backups = self.list_backups().await?;
        let excess = backups.len().saturating_sub(keep);
        let mut removed = Vec::with_capacity(excess);
        for handle in backups.into_iter().take(excess) {
            remove_dir_if_exists(&handle.path).await?;
            debug!(path = %handle.path.display(), "pruned backup");
            removed.push(handle.path);
        }
        if !removed.is_empty() {
            info!(removed = removed.len(), keep, "pruned old backups");
        }
        Ok(removed)
    }

    /// [`prune_backups`](Self::prune_backups) with the configured retention.
    pub async fn prune_to_retention(&self) -> Result<Vec<PathBuf>, MnemoError> {
        self.prune_backups(self.keep_backups).await
    }

    /// Creates a fresh backup directory, adding a counter on name collisions.
    async fn reserve_dir(&self, timestamp: &DateTime<Utc>, label: &str) -> Result<PathBuf, MnemoError> {
        tokio::fs::create_dir_all(&self.backup_dir)
            .await
            .map_err(|e| MnemoError::io(&self.backup_dir, e))?;
        let stamp = timestamp.format(TIMESTAMP_FORMAT).to_string();
        let mut attempt = 1;
        loop {
            let name = if attempt == 1 {
                format!("{stamp}_{label}")
            } else {
                format!("{stamp}_{label}-{attempt}")
            };
            let path = self.backup_dir.join(name);
            match tokio::fs::create_dir(&path).await {
                Ok(()) => return Ok(path),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => attempt += 1,
                Err(e) => return Err(MnemoError::io(&path, e)),
            }
        }
    }
}

/// Copies `src` into `dst` with an explicit work stack.
///
/// Temp files and symlinks are skipped. Returns the number of entity files
/// copied. A missing `src` produces an empty `dst`.
pub(crate) async fn copy_tree(src: &Path, dst: &Path) -> Result<usize, MnemoError> {
    tokio::fs::create_dir_all(dst)
        .await
        .map_err(|e| MnemoError::io(dst, e))?;

    let mut entities = 0;
    let mut stack = vec![(src.to_path_buf(), dst.to_path_buf(), 0usize)];
    while let Some((from, to, depth)) = stack.pop() {
        let mut entries = match tokio::fs::read_dir(&from).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(MnemoError::io(&from, e)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| MnemoError::io(&from, e))?
        {
            let path = entry.path();
            let target = to.join(entry.file_name());
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| MnemoError::io(&path, e))?;

            if file_type.is_dir() {
                if depth + 1 >= MAX_WALK_DEPTH {
                    warn!(path = %path.display(), "directory exceeds copy depth, skipping");
                    continue;
                }
                tokio::fs::create_dir_all(&target)
                    .await
                    .map_err(|e| MnemoError::io(&target, e))?;
                stack.push((path, target, depth + 1));
            } else if file_type.is_file() {
                if is_temp_file(&entry.file_name().to_string_lossy()) {
                    continue;
                }
                tokio::fs::copy(&path, &target)
                    .await
                    .map_err(|e| MnemoError::io(&path, e))?;
                if path.extension().is_some_and(|ext| ext == ENTITY_EXT) {
                    entities += 1;
                }
            }
        }
    }
    Ok(entities)
}

async fn remove_dir_if_exists(path: &Path) -> Result<(), MnemoError> {
    match tokio::fs::remove_dir_all(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MnemoError::io(path, e)),
    }
}
