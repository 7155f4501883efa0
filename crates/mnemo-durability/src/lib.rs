// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durability layer for Mnemo storage.
//!
//! Snapshot backups of the entity trees, wholesale restore, read-only health
//! checks and orphan cleanup. Destructive operations take a backup first.

pub mod backup;
pub mod health;

pub use backup::{
    BackupHandle, BackupManifest, Durability, EntityCounts, ManifestContents, RestoreReport,
};
pub use health::{HealthIssue, HealthReport, HealthStatus};
