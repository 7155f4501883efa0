// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status propagation: a parent's effective status derived from its children.
//!
//! Nothing here is stored; effective statuses are computed on read.

use std::collections::HashMap;

use mnemo_core::{Task, TaskStatus};

use crate::path::path_depth;

/// Effective status of a task from its explicit status and the effective
/// statuses of its children.
///
/// Explicit `blocked` and `archived` always win. Archived children are
/// ignored. With no remaining children the explicit status stands; all
/// children `done` gives `done`; any child `in_progress` or `done` gives
/// `in_progress`.
pub fn effective_status(explicit: TaskStatus, children: &[TaskStatus]) -> TaskStatus {
    if matches!(explicit, TaskStatus::Blocked | TaskStatus::Archived) {
        return explicit;
    }
    let active: Vec<TaskStatus> = children
        .iter()
        .copied()
        .filter(|s| *s != TaskStatus::Archived)
        .collect();
    if active.is_empty() {
        return explicit;
    }
    if active.iter().all(|s| *s == TaskStatus::Done) {
        return TaskStatus::Done;
    }
    if active
        .iter()
        .any(|s| matches!(s, TaskStatus::InProgress | TaskStatus::Done))
    {
        return TaskStatus::InProgress;
    }
    explicit
}

/// Effective status of every task in `tasks`, keyed by id.
///
/// `tasks` should be a closed subtree (or a whole project); children missing
/// from the slice are treated as absent.
pub fn propagate(tasks: &[Task]) -> HashMap<String, TaskStatus> {
    let mut order: Vec<&Task> = tasks.iter().collect();
    // Deepest first, so children are resolved before their parents.
    order.sort_by_key(|t| std::cmp::Reverse(path_depth(&t.path)));

    let mut children: HashMap<&str, Vec<&str>> = HashMap::new();
    for task in tasks {
        if let Some(parent) = task.parent_id.as_deref() {
            children.entry(parent).or_default().push(&task.id);
        }
    }

    let mut resolved: HashMap<String, TaskStatus> = HashMap::with_capacity(tasks.len());
    for task in order {
        let child_statuses: Vec<TaskStatus> = children
            .get(task.id.as_str())
            .into_iter()
            .flatten()
            .filter_map(|id| resolved.get(*id).copied())
            .collect();
        resolved.insert(task.id.clone(), effective_status(task.status, &child_statuses));
    }
    resolved
}
