// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Classification of every file in the entity trees, for health checks.
//!
//! A scan never modifies anything.

use std::path::{Path, PathBuf};

use mnemo_core::{EntityKind, Memory, MnemoError, Task};
use serde::Serialize;
use strum::Display;

use crate::codec::Entity;
use crate::layout::{ROOT_SEQ_FILE, is_temp_file, kind_dir};
use crate::store::{ENTITY_DEPTH, EntityStore, is_entity_file_name, read_entity};
use crate::walk::{MAX_WALK_DEPTH, walk_files};

/// Why a file is an orphan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum OrphanReason {
    /// Not an entity file (wrong extension or hidden).
    NotEntityFile,
    /// Leftover of an interrupted atomic write.
    TempFile,
    /// A valid entity file at the wrong location.
    Misplaced,
}

/// One classified file.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "class", rename_all = "snake_case")]
pub enum ScanEntry {
    Entity {
        kind: EntityKind,
        path: PathBuf,
    },
    Corrupt {
        kind: EntityKind,
        path: PathBuf,
        reason: String,
    },
    Orphan {
        path: PathBuf,
        reason: OrphanReason,
    },
}

/// Everything a scan found.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    pub entries: Vec<ScanEntry>,
    /// Entity trees that are missing or could not be read, with the problem.
    pub tree_problems: Vec<(PathBuf, String)>,
}

impl ScanReport {
    pub fn entity_count(&self, kind: EntityKind) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, ScanEntry::Entity { kind: k, .. } if *k == kind))
            .count()
    }

    pub fn corrupt(&self) -> impl Iterator<Item = (&Path, &str)> {
        self.entries.iter().filter_map(|e| match e {
            ScanEntry::Corrupt { path, reason, .. } => Some((path.as_path(), reason.as_str())),
            _ => None,
        })
    }

    pub fn orphans(&self) -> impl Iterator<Item = (&Path, OrphanReason)> {
        self.entries.iter().filter_map(|e| match e {
            ScanEntry::Orphan { path, reason } => Some((path.as_path(), *reason)),
            _ => None,
        })
    }
}

impl EntityStore {
    /// Classifies every file under `tasks/` and `memories/`.
    pub async fn scan(&self) -> Result<ScanReport, MnemoError> {
        let mut report = ScanReport::default();
        for kind in [EntityKind::Task, EntityKind::Memory] {
            let tree = kind_dir(self.root(), kind);
            match tokio::fs::metadata(&tree).await {
                Ok(meta) if meta.is_dir() => {}
                Ok(_) => {
                    report
                        .tree_problems
                        .push((tree, "not a directory".to_string()));
                    continue;
                }
                Err(e) => {
                    report.tree_problems.push((tree, e.to_string()));
                    continue;
                }
            }

            let files = match walk_files(&tree, MAX_WALK_DEPTH).await {
                Ok(files) => files,
                Err(e) => {
                    report.tree_problems.push((tree, e.to_string()));
                    continue;
                }
            };

            for file in files {
                if let Some(entry) = self.classify(kind, &file.path, file.depth).await? {
                    report.entries.push(entry);
                }
            }
        }
        Ok(report)
    }

    async fn classify(
        &self,
        kind: EntityKind,
        path: &Path,
        depth: usize,
    ) -> Result<Option<ScanEntry>, MnemoError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let orphan = |reason| {
            Ok(Some(ScanEntry::Orphan {
                path: path.to_path_buf(),
                reason,
            }))
        };

        if kind == EntityKind::Task && depth == ENTITY_DEPTH && name == ROOT_SEQ_FILE {
            return Ok(None);
        }
        if is_temp_file(&name) {
            return orphan(OrphanReason::TempFile);
        }
        if !is_entity_file_name(path) {
            return orphan(OrphanReason::NotEntityFile);
        }
        if depth != ENTITY_DEPTH {
            return orphan(OrphanReason::Misplaced);
        }

        let placed = match kind {
            EntityKind::Memory => self.check_placement::<Memory>(path).await,
            EntityKind::Task => self.check_placement::<Task>(path).await,
        };
        match placed {
            Ok(true) => Ok(Some(ScanEntry::Entity {
                kind,
                path: path.to_path_buf(),
            })),
            Ok(false) => orphan(OrphanReason::Misplaced),
            Err(MnemoError::Corrupt { path, reason }) => {
                Ok(Some(ScanEntry::Corrupt { kind, path, reason }))
            }
            Err(MnemoError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    /// Decodes `path` and checks it sits where its header says it should.
    async fn check_placement<E: Entity>(&self, path: &Path) -> Result<bool, MnemoError> {
        let entity = read_entity::<E>(path).await?;
        Ok(self.entity_path(&entity) == path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use mnemo_core::NewMemory;

    use super::*;

    #[tokio::test]
    async fn scan_classifies_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = EntityStore::new(dir.path());
        store.init().await.unwrap();

        let memory = Memory::new(NewMemory::new("good"), Utc::now()).unwrap();
        let good = store.write(&memory).await.unwrap();
        let project = good.parent().unwrap().to_path_buf();

        tokio::fs::write(project.join("notes.txt"), "x").await.unwrap();
        tokio::fs::write(project.join(".a.md.123.tmp"), "x").await.unwrap();
        tokio::fs::write(project.join("broken.md"), "nope").await.unwrap();
        tokio::fs::copy(&good, project.join("renamed.md")).await.unwrap();
        store.write_root_seq("default", 3).await.unwrap();

        let report = store.scan().await.unwrap();
        assert_eq!(report.entity_count(EntityKind::Memory), 1);
        assert_eq!(report.corrupt().count(), 1);

        let mut reasons: Vec<OrphanReason> = report.orphans().map(|(_, r)| r).collect();
        reasons.sort_by_key(|r| r.to_string());
        assert_eq!(
            reasons,
            vec![
                OrphanReason::Misplaced,
                OrphanReason::NotEntityFile,
                OrphanReason::TempFile
            ]
        );
        assert!(report.tree_problems.is_empty());
    }

    #[tokio::test]
    async fn missing_trees_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = EntityStore::new(dir.path());
        let report = store.scan().await.unwrap();
        assert_eq!(report.tree_problems.len(), 2);
        assert!(report.entries.is_empty());
    }
}
