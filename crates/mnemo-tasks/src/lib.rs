// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Task hierarchy for Mnemo.
//!
//! Tasks form a four-level tree (master, epic, task, subtask) encoded as a
//! materialized path such as `001-launch-1a2b3c4d.002-api-5e6f7a8b`. The path
//! doubles as the task's file name, so a directory listing sorts in tree order.

pub mod manager;
pub mod path;
pub mod status;

pub use manager::{
    DeleteOptions, EXPLICIT_STRENGTH, TaskFilter, TaskManager, TaskNode, TaskPatch,
};
pub use path::{
    PathLimits, PathSegment, PathValidation, generate_path, generate_slug, is_descendant_path,
    parse_path, path_depth, validate_path,
};
pub use status::{effective_status, propagate};
