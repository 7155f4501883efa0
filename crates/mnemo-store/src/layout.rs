// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Names and locations inside the storage root.

use std::path::{Path, PathBuf};

use mnemo_core::{EntityKind, sanitize_file_stem, sanitize_project};

pub const TASKS_DIR: &str = "tasks";
pub const MEMORIES_DIR: &str = "memories";
pub const BACKUPS_DIR: &str = "backups";

/// Per-project high-water mark of master `path_order` values.
pub const ROOT_SEQ_FILE: &str = "root.seq";

pub const ENTITY_EXT: &str = "md";

/// Suffix of in-flight temp files written before the atomic rename.
pub const TEMP_SUFFIX: &str = ".tmp";

/// Length of the id-derived suffix at the end of every task slug.
pub const ID_SUFFIX_LEN: usize = 8;

/// Directory holding every entity of `kind`.
pub fn kind_dir(root: &Path, kind: EntityKind) -> PathBuf {
    match kind {
        EntityKind::Memory => root.join(MEMORIES_DIR),
        EntityKind::Task => root.join(TASKS_DIR),
    }
}

/// Directory holding the entities of `kind` for one project.
pub fn project_dir(root: &Path, kind: EntityKind, project: &str) -> PathBuf {
    kind_dir(root, kind).join(sanitize_project(project))
}

/// Eight lowercase alphanumerics derived from `id`, zero-padded.
///
/// An id without usable characters yields `00000000`.
pub fn id_suffix(id: &str) -> String {
    let mut suffix: String = id
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .take(ID_SUFFIX_LEN)
        .collect();
    while suffix.len() < ID_SUFFIX_LEN {
        suffix.push('0');
    }
    suffix
}

/// File name of a task: its materialized path plus the entity extension.
pub fn task_file_name(path: &str) -> String {
    format!("{path}.{ENTITY_EXT}")
}

/// File name of a memory: its sanitized id plus the entity extension.
pub fn memory_file_name(id: &str) -> String {
    format!("{}.{ENTITY_EXT}", sanitize_file_stem(id))
}

/// Whether a file name looks like an interrupted atomic write.
pub fn is_temp_file(name: &str) -> bool {
    name.ends_with(TEMP_SUFFIX)
}

/// Sibling temp path for an atomic write of `target`.
pub(crate) fn temp_path_for(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    target.with_file_name(format!(".{name}.{}{TEMP_SUFFIX}", uuid::Uuid::new_v4().simple()))
}
