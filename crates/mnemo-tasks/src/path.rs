// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Materialized paths.
//!
//! A task path is one segment per level joined by `.`, each segment being
//! `{order:03}-{slug}`:
//!
//! ```text
//! 001-launch-3f2b9c1e.002-backend-9a8b7c6d
//! ```
//!
//! The file backing a task is `{path}.md`, so the tree order is the file
//! name order.

use std::path::Path;

use mnemo_config::StorageConfig;
use mnemo_core::{MnemoError, TaskLevel};
use mnemo_store::id_suffix;

pub use mnemo_store::task_file_name;

pub const SEGMENT_SEPARATOR: char = '.';

/// Slug text before the id suffix is cut to this many characters.
pub const SLUG_MAX_LEN: usize = 30;

/// Minimum digits of the order prefix.
pub const ORDER_WIDTH: usize = 3;

/// Slug text used when a title has no usable characters.
pub const UNTITLED: &str = "untitled";

const RESERVED_CHARS: &[char] = &['<', '>', ':', '"', '|', '?', '*', '\\', '/'];

/// Filesystem-safe slug for a task: title text plus an id-derived suffix.
///
/// Never fails. Anything outside `[a-z0-9]` becomes a hyphen, hyphen runs
/// collapse, and the text is cut to [`SLUG_MAX_LEN`] characters before the
/// suffix is appended.
pub fn generate_slug(title: &str, id: &str) -> String {
    let mut text = String::with_capacity(title.len());
    let mut last_dash = true;
    for ch in title.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_lowercase() || ch.is_ascii_digit() {
            text.push(ch);
            last_dash = false;
        } else if !last_dash {
            text.push('-');
            last_dash = true;
        }
    }
    let text: String = text.chars().take(SLUG_MAX_LEN).collect();
    let text = text.trim_matches('-');
    let text = if text.is_empty() { UNTITLED } else { text };
    format!("{text}-{}", id_suffix(id))
}

/// Path of a task placed at `path_order` under `parent_path` (`None` for masters).
pub fn generate_path(parent_path: Option<&str>, path_order: u32, slug: &str) -> String {
    let segment = format!("{path_order:0width$}-{slug}", width = ORDER_WIDTH);
    match parent_path {
        Some(parent) if !parent.is_empty() => format!("{parent}{SEGMENT_SEPARATOR}{segment}"),
        _ => segment,
    }
}

/// Limits a generated path is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PathLimits {
    /// Longest allowed full file path, in bytes.
    pub max_path_length: usize,
    /// Length of the directory the task file is placed in.
    pub base_dir_len: usize,
}

impl Default for PathLimits {
    fn default() -> Self {
        Self {
            max_path_length: if cfg!(windows) { 260 } else { 4096 },
            base_dir_len: 0,
        }
    }
}

impl PathLimits {
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            max_path_length: config.max_path_length,
            base_dir_len: 0,
        }
    }

    /// The same limits for files placed in `dir`.
    pub fn in_dir(self, dir: &Path) -> Self {
        Self {
            base_dir_len: dir.as_os_str().len(),
            ..self
        }
    }
}

/// Outcome of [`validate_path`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathValidation {
    pub valid: bool,
    pub reason: Option<String>,
}

impl PathValidation {
    fn ok() -> Self {
        Self {
            valid: true,
            reason: None,
        }
    }

    fn invalid(reason: impl Into<String>) -> Self {
        Self {
            valid: false,
            reason: Some(reason.into()),
        }
    }

    /// Converts an invalid result into [`MnemoError::Validation`].
    pub fn into_result(self) -> Result<(), MnemoError> {
        match self.reason {
            Some(reason) if !self.valid => Err(MnemoError::Validation(reason)),
            _ => Ok(()),
        }
    }
}

/// Checks a materialized path for structure, characters, depth and length.
pub fn validate_path(path: &str, limits: &PathLimits) -> PathValidation {
    if path.is_empty() {
        return PathValidation::invalid("path is empty");
    }
    if let Some(ch) = path
        .chars()
        .find(|c| RESERVED_CHARS.contains(c) || c.is_control())
    {
        return PathValidation::invalid(format!("path contains reserved character {ch:?}"));
    }

    let segments: Vec<&str> = path.split(SEGMENT_SEPARATOR).collect();
    if segments.len() > TaskLevel::MAX_DEPTH {
        return PathValidation::invalid(format!(
            "path depth {} exceeds the maximum of {}",
            segments.len(),
            TaskLevel::MAX_DEPTH
        ));
    }
    if let Some(bad) = segments.iter().find(|s| parse_segment(s).is_none()) {
        return PathValidation::invalid(format!("malformed path segment `{bad}`"));
    }

    // +1 for the separator between directory and file name.
    let file_len = limits.base_dir_len + 1 + task_file_name(path).len();
    if file_len > limits.max_path_length {
        return PathValidation::invalid(format!(
            "file path length {file_len} exceeds the maximum of {}",
            limits.max_path_length
        ));
    }
    PathValidation::ok()
}

/// One decoded path segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathSegment {
    pub level: TaskLevel,
    pub order: u32,
    pub slug: String,
}

/// Splits a path into its segments, the inverse of [`generate_path`].
pub fn parse_path(path: &str) -> Result<Vec<PathSegment>, MnemoError> {
    if path.is_empty() {
        return Err(MnemoError::Validation("path is empty".to_string()));
    }
    path.split(SEGMENT_SEPARATOR)
        .enumerate()
        .map(|(i, segment)| {
            let level = TaskLevel::from_depth(i + 1).ok_or_else(|| {
                MnemoError::Validation(format!(
                    "path `{path}` is deeper than {} levels",
                    TaskLevel::MAX_DEPTH
                ))
            })?;
            let (order, slug) = parse_segment(segment).ok_or_else(|| {
                MnemoError::Validation(format!("malformed path segment `{segment}`"))
            })?;
            Ok(PathSegment {
                level,
                order,
                slug: slug.to_string(),
            })
        })
        .collect()
}

/// `NNN-slug` with at least three digits and a `[a-z0-9-]` slug.
fn parse_segment(segment: &str) -> Option<(u32, &str)> {
    let (order, slug) = segment.split_once('-')?;
    if order.len() < ORDER_WIDTH || !order.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let valid_slug = !slug.is_empty()
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && slug
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
    if !valid_slug {
        return None;
    }
    Some((order.parse().ok()?, slug))
}

/// Depth of a path (number of segments).
pub fn path_depth(path: &str) -> usize {
    if path.is_empty() {
        0
    } else {
        path.split(SEGMENT_SEPARATOR).count()
    }
}

/// Whether `path` lies strictly below `ancestor`.
pub fn is_descendant_path(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len()
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(SEGMENT_SEPARATOR)
}
