// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Read-only health check and orphan cleanup.

use std::path::PathBuf;

use mnemo_core::{EntityKind, MnemoError};
use mnemo_store::{ScanEntry, ScanReport};
use serde::Serialize;
use strum::Display;
use tracing::{info, warn};

use crate::backup::Durability;

/// Label of the backup taken before orphan cleanup.
pub const CLEANUP_LABEL: &str = "pre-cleanup";

/// Overall verdict, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthIssue {
    pub severity: HealthStatus,
    pub path: PathBuf,
    pub message: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub tasks: usize,
    pub memories: usize,
    pub corrupt: usize,
    pub orphans: usize,
    pub issues: Vec<HealthIssue>,
}

impl HealthReport {
    /// Corrupt files or unreadable trees are errors, orphans are warnings.
    pub fn from_scan(scan: &ScanReport) -> Self {
        let mut issues = Vec::new();
        for (path, problem) in &scan.tree_problems {
            issues.push(HealthIssue {
                severity: HealthStatus::Error,
                path: path.clone(),
                message: format!("entity tree unavailable: {problem}"),
            });
        }
        for entry in &scan.entries {
            match entry {
                ScanEntry::Corrupt { kind, path, reason } => issues.push(HealthIssue {
                    severity: HealthStatus::Error,
                    path: path.clone(),
                    message: format!("corrupt {kind} file: {reason}"),
                }),
                ScanEntry::Orphan { path, reason } => issues.push(HealthIssue {
                    severity: HealthStatus::Warning,
                    path: path.clone(),
                    message: format!("orphan file ({reason})"),
                }),
                ScanEntry::Entity { .. } => {}
            }
        }

        let status = issues
            .iter()
            .map(|i| i.severity)
            .max()
            .unwrap_or(HealthStatus::Healthy);
        Self {
            status,
            tasks: scan.entity_count(EntityKind::Task),
            memories: scan.entity_count(EntityKind::Memory),
            corrupt: scan.corrupt().count(),
            orphans: scan.orphans().count(),
            issues,
        }
    }
}

impl Durability {
    /// Classifies every stored file. Never modifies anything.
    pub async fn health_check(&self) -> Result<HealthReport, MnemoError> {
        let report = HealthReport::from_scan(&self.store.scan().await?);
        info!(
            status = %report.status,
            tasks = report.tasks,
            memories = report.memories,
            corrupt = report.corrupt,
            orphans = report.orphans,
            "health check"
        );
        Ok(report)
    }

    /// Deletes orphan files after backing up. Corrupt entity files are kept.
    ///
    /// Returns the number of files removed. No backup is taken when there is
    /// nothing to remove.
    pub async fn cleanup_orphans(&self) -> Result<usize, MnemoError> {
        let scan = self.store.scan().await?;
        let orphans: Vec<PathBuf> = scan.orphans().map(|(p, _)| p.to_path_buf()).collect();
        if orphans.is_empty() {
            return Ok(0);
        }

        let backup = self.backup(CLEANUP_LABEL).await?;
        let mut removed = 0;
        for path in orphans {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!(path = %path.display(), error = %e, "failed to remove orphan"),
            }
        }
        info!(removed, backup = %backup.path.display(), "orphan cleanup complete");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use mnemo_store::OrphanReason;

    use super::*;

    #[test]
    fn empty_scan_is_healthy() {
        let report = HealthReport::from_scan(&ScanReport::default());
        assert_eq!(report.status, HealthStatus::Healthy);
        assert!(report.issues.is_empty());
    }

    #[test]
    fn orphans_warn_and_corruption_errors() {
        let mut scan = ScanReport::default();
        scan.entries.push(ScanEntry::Orphan {
            path: PathBuf::from("tasks/p/notes.txt"),
            reason: OrphanReason::NotEntityFile,
        });
        assert_eq!(HealthReport::from_scan(&scan).status, HealthStatus::Warning);

        scan.entries.push(ScanEntry::Corrupt {
            kind: EntityKind::Memory,
            path: PathBuf::from("memories/p/m.md"),
            reason: "missing header".into(),
        });
        let report = HealthReport::from_scan(&scan);
        assert_eq!(report.status, HealthStatus::Error);
        assert_eq!(report.corrupt, 1);
        assert_eq!(report.orphans, 1);
    }

    #[test]
    fn status_names_are_snake_case() {
        assert_eq!(HealthStatus::Warning.to_string(), "warning");
    }
}
