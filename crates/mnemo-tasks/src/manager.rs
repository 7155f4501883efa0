// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hierarchical task manager.
//!
//! Owns placement: every create or move computes `path_order` while holding
//! the async lock of the parent (or of the project root for masters), so two
//! concurrent siblings can never receive the same order. Orders are never
//! reused: each parent records the highest order it ever handed out in
//! `child_sequence`, and masters use the project's `root.seq` file.

use std::cmp::Reverse;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use mnemo_core::types::normalize_tags;
use mnemo_core::{
    ConnectionType, EntityKind, MemoryConnection, MnemoError, NewTask, Placement, Priority, Task,
    TaskLevel, TaskStatus, sanitize_project,
};
use mnemo_store::EntityStore;
use mnemo_store::layout::project_dir;
use serde::Serialize;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::path::{
    PathLimits, generate_path, generate_slug, is_descendant_path, parse_path, path_depth,
    validate_path,
};
use crate::status::propagate;

/// Attempts at locking a subtree that keeps gaining descendants.
const MAX_LOCK_ROUNDS: usize = 16;

/// Strength recorded for manual links.
pub const EXPLICIT_STRENGTH: f64 = 1.0;

/// Field edits for [`TaskManager::update_task`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub tags: Option<Vec<String>>,
    pub status: Option<TaskStatus>,
    /// Move under another parent. `Some(None)` is a move to the root, which
    /// only a master (already there) may request.
    pub parent_id: Option<Option<String>>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DeleteOptions {
    /// Delete the whole subtree instead of rejecting a task with children.
    pub cascade: bool,
}

/// Criteria for [`TaskManager::list_tasks`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    pub project: Option<String>,
    pub status: Option<TaskStatus>,
    pub level: Option<TaskLevel>,
    pub parent_id: Option<String>,
    pub tag: Option<String>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        self.status.is_none_or(|s| task.status == s)
            && self.level.is_none_or(|l| task.level == l)
            && self
                .parent_id
                .as_deref()
                .is_none_or(|p| task.parent_id.as_deref() == Some(p))
            && self
                .tag
                .as_deref()
                .is_none_or(|tag| task.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }
}

/// A task with its effective status and children, for tree views.
#[derive(Debug, Clone, Serialize)]
pub struct TaskNode {
    pub task: Task,
    pub effective_status: TaskStatus,
    pub children: Vec<TaskNode>,
}

/// Creates, moves, updates and deletes tasks in the materialized-path tree.
pub struct TaskManager {
    store: EntityStore,
    limits: PathLimits,
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TaskManager {
    pub fn new(store: EntityStore, limits: PathLimits) -> Self {
        Self {
            store,
            limits,
            locks: DashMap::new(),
        }
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Validates, places and persists a new task.
    ///
    /// The returned task has no memory connections; linking runs afterwards.
    pub async fn create_task(&self, mut input: NewTask) -> Result<Task, MnemoError> {
        input.validate()?;
        let id = match input.id.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => uuid::Uuid::new_v4().to_string(),
        };
        if self.store.locate::<Task>(&id).await?.is_some() {
            return Err(MnemoError::Validation(format!("task {id} already exists")));
        }

        let parent = match input.parent_id.as_deref() {
            Some(parent_id) => Some(self.require_parent(parent_id, input.level).await?),
            None => None,
        };
        // Children always live in their parent's project.
        let project = match &parent {
            Some(p) => p.project.clone(),
            None => sanitize_project(input.project.as_deref().unwrap_or_default()),
        };
        input.project = Some(project.clone());

        let _guard = self
            .lock(placement_key(&project, input.parent_id.as_deref()))
            .await;

        // Re-read under the lock; a concurrent create may have advanced the sequence.
        let parent = match parent {
            Some(p) => Some(self.store.read::<Task>(&p.id).await?),
            None => None,
        };
        let order = self.next_order(&project, parent.as_ref()).await?;
        let slug = generate_slug(&input.title, &id);
        let path = generate_path(parent.as_ref().map(|p| p.path.as_str()), order, &slug);
        self.check_path(&project, &path)?;

        let task = Task::new(
            id,
            input,
            Placement {
                path,
                path_order: order,
                slug,
            },
            Utc::now(),
        )?;
        self.store.write(&task).await?;
        self.record_order(&project, parent, order).await?;

        info!(
            id = %task.id,
            level = %task.level,
            path = %task.path,
            project = %task.project,
            "task created"
        );
        Ok(task)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, MnemoError> {
        self.store.read(id).await
    }

    /// Applies `patch`. Moves happen first, then field edits.
    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, MnemoError> {
        if let Some(title) = &patch.title
            && title.trim().is_empty()
        {
            return Err(MnemoError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
        let current = self.store.read::<Task>(id).await?;
        if let Some(next) = patch.status {
            check_transition(&current, next)?;
        }

        if let Some(new_parent) = &patch.parent_id {
            self.move_task(id, new_parent.as_deref()).await?;
        }

        let TaskPatch {
            title,
            description,
            priority,
            tags,
            status,
            ..
        } = patch;
        let nothing_to_edit = title.is_none()
            && description.is_none()
            && priority.is_none()
            && tags.is_none()
            && status.is_none();
        if nothing_to_edit {
            return self.store.read(id).await;
        }

        self.modify(id, move |task| {
            if let Some(title) = title {
                task.title = title.trim().to_string();
            }
            if let Some(description) = description {
                task.description = description;
            }
            if let Some(priority) = priority {
                task.priority = priority;
            }
            if let Some(tags) = tags {
                task.tags = normalize_tags(tags);
            }
            if let Some(next) = status {
                check_transition(task, next)?;
                task.status = next;
            }
            Ok(())
        })
        .await
    }

    /// Locked read-modify-write of one task. Sets `updated_at`.
    ///
    /// `f` must not change placement fields (`path`, `level`, `parent_id`).
    pub async fn modify<F>(&self, id: &str, f: F) -> Result<Task, MnemoError>
    where
        F: FnOnce(&mut Task) -> Result<(), MnemoError>,
    {
        let _guard = self.lock(task_key(id)).await;
        let mut task = self.store.read::<Task>(id).await?;
        f(&mut task)?;
        task.updated_at = Utc::now();
        self.store.write(&task).await?;
        Ok(task)
    }

    /// Moves a task (and its subtree) under `new_parent`.
    ///
    /// Every descendant's path and level is rewritten. The rewrite is a batch
    /// of single-file writes, not one atomic step. The whole subtree stays
    /// locked meanwhile, so creates under any of it wait and see the new paths.
    pub async fn move_task(&self, id: &str, new_parent: Option<&str>) -> Result<Task, MnemoError> {
        let task = self.store.read::<Task>(id).await?;
        let Some(new_parent_id) = new_parent else {
            if task.is_root() {
                return Ok(task);
            }
            return Err(MnemoError::InvalidHierarchy(format!(
                "task {id} cannot be moved to the root: only masters have no parent"
            )));
        };
        if task.parent_id.as_deref() == Some(new_parent_id) {
            return Ok(task);
        }
        if new_parent_id == id {
            return Err(MnemoError::InvalidHierarchy(format!(
                "task {id} cannot be moved under itself"
            )));
        }

        let (_guards, task, descendants) = self.lock_subtree(task, new_parent_id).await?;
        let mut parent = self.existing_parent(new_parent_id).await?;

        if parent.project != task.project {
            return Err(MnemoError::InvalidHierarchy(format!(
                "task {id} cannot be moved from project {} to {}",
                task.project, parent.project
            )));
        }
        if is_descendant_path(&parent.path, &task.path) {
            return Err(MnemoError::InvalidHierarchy(format!(
                "task {id} cannot be moved under its own descendant {new_parent_id}"
            )));
        }

        let old_depth = path_depth(&task.path);
        let height = descendants
            .iter()
            .map(|t| path_depth(&t.path))
            .max()
            .unwrap_or(old_depth)
            - old_depth
            + 1;
        let new_depth = parent.level.depth() + 1;
        if new_depth + height - 1 > TaskLevel::MAX_DEPTH {
            return Err(MnemoError::InvalidHierarchy(format!(
                "moving task {id} under {new_parent_id} would exceed {} levels",
                TaskLevel::MAX_DEPTH
            )));
        }

        // The parent's lock doubles as its placement lock.
        let order = self.next_order(&task.project, Some(&parent)).await?;
        let new_path = generate_path(Some(&parent.path), order, &task.slug);
        let now = Utc::now();

        let mut moved = task.clone();
        moved.parent_id = Some(parent.id.clone());
        moved.path = new_path.clone();
        moved.path_order = order;
        moved.level = level_at(new_depth)?;
        moved.updated_at = now;
        self.check_path(&task.project, &moved.path)?;

        let mut rewrites = Vec::with_capacity(descendants.len());
        for old in descendants {
            let mut new = old.clone();
            new.path = format!("{new_path}{}", &old.path[task.path.len()..]);
            new.level = level_at(path_depth(&new.path))?;
            new.updated_at = now;
            self.check_path(&task.project, &new.path)?;
            rewrites.push((old, new));
        }

        self.store.replace(&task, &moved).await?;
        for (old, new) in &rewrites {
            self.store.replace(old, new).await?;
        }
        parent.child_sequence = parent.child_sequence.max(order);
        self.store.write(&parent).await?;

        info!(
            id,
            from = %task.path,
            to = %moved.path,
            descendants = rewrites.len(),
            "task moved"
        );
        Ok(moved)
    }

    /// Deletes a task. Without `cascade`, a task with children is rejected.
    ///
    /// Returns the ids removed, leaves first.
    pub async fn delete_task(
        &self,
        id: &str,
        options: DeleteOptions,
    ) -> Result<Vec<String>, MnemoError> {
        let task = self.store.read::<Task>(id).await?;
        let mut doomed = self.descendants(&task).await?;
        if !doomed.is_empty() && !options.cascade {
            return Err(MnemoError::InvalidHierarchy(format!(
                "task {id} has {} descendant(s); delete with cascade to remove them",
                doomed.len()
            )));
        }

        let _guard = self.lock(task_key(id)).await;
        doomed.sort_by_key(|t| Reverse(path_depth(&t.path)));
        let mut removed = Vec::with_capacity(doomed.len() + 1);
        for t in doomed {
            match self.store.delete::<Task>(&t.id).await {
                Ok(_) => removed.push(t.id),
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        self.store.delete::<Task>(id).await?;
        removed.push(id.to_string());

        info!(id, removed = removed.len(), "task deleted");
        Ok(removed)
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, MnemoError> {
        let project = filter.project.as_deref().map(sanitize_project);
        let listing = self
            .store
            .list::<Task, _>(project.as_deref(), |t| filter.matches(t))
            .await?;
        if listing.corrupt > 0 {
            warn!(corrupt = listing.corrupt, "task listing skipped corrupt files");
        }
        Ok(listing.items)
    }

    /// Direct children ordered by `path_order`.
    pub async fn children(&self, id: &str) -> Result<Vec<Task>, MnemoError> {
        let task = self.store.read::<Task>(id).await?;
        let mut children = self.store.siblings(&task.project, Some(id)).await?;
        children.sort_by_key(|t| t.path_order);
        Ok(children)
    }

    /// The task followed by all of its descendants, in path order.
    pub async fn subtree(&self, id: &str) -> Result<Vec<Task>, MnemoError> {
        let task = self.store.read::<Task>(id).await?;
        let descendants = self.descendants(&task).await?;
        let mut out = Vec::with_capacity(descendants.len() + 1);
        out.push(task);
        out.extend(descendants);
        Ok(out)
    }

    /// Nested view of a project (or of everything) with effective statuses.
    pub async fn tree(&self, project: Option<&str>) -> Result<Vec<TaskNode>, MnemoError> {
        let tasks = self
            .list_tasks(&TaskFilter {
                project: project.map(str::to_string),
                ..TaskFilter::default()
            })
            .await?;
        Ok(build_tree(tasks))
    }

    /// The chain from the master down to `id`.
    pub async fn ancestry(&self, id: &str) -> Result<Vec<Task>, MnemoError> {
        let task = self.store.read::<Task>(id).await?;
        let segments = parse_path(&task.path)?;
        let mut chain = vec![task];
        while let Some(parent_id) = chain.last().and_then(|t| t.parent_id.clone()) {
            if chain.len() >= TaskLevel::MAX_DEPTH {
                return Err(MnemoError::InvalidHierarchy(format!(
                    "ancestor chain of task {id} does not end at a master"
                )));
            }
            chain.push(self.store.read::<Task>(&parent_id).await?);
        }
        chain.reverse();
        if chain.len() != segments.len() {
            return Err(MnemoError::InvalidHierarchy(format!(
                "task {id} has {} path segments but {} ancestors",
                segments.len(),
                chain.len()
            )));
        }
        Ok(chain)
    }

    /// Effective status of `id` derived from its subtree.
    pub async fn compute_status_propagation(&self, id: &str) -> Result<TaskStatus, MnemoError> {
        let subtree = self.subtree(id).await?;
        propagate(&subtree)
            .remove(id)
            .ok_or_else(|| MnemoError::not_found(EntityKind::Task, id))
    }

    /// Records a manual link. Replaces any computed entry for the same memory.
    pub async fn link_memory_explicit(
        &self,
        task_id: &str,
        memory_id: &str,
    ) -> Result<Task, MnemoError> {
        let memory_id = memory_id.to_string();
        self.modify(task_id, move |task| {
            task.memory_connections.retain(|c| c.memory_id != memory_id);
            let at = task
                .memory_connections
                .iter()
                .take_while(|c| c.connection_type == ConnectionType::Explicit)
                .count();
            task.memory_connections.insert(
                at,
                MemoryConnection {
                    memory_id,
                    connection_type: ConnectionType::Explicit,
                    strength: EXPLICIT_STRENGTH,
                },
            );
            Ok(())
        })
        .await
    }

    /// Removes every connection to `memory_id`. Returns whether one existed.
    pub async fn unlink_memory(&self, task_id: &str, memory_id: &str) -> Result<bool, MnemoError> {
        let mut removed = false;
        self.modify(task_id, |task| {
            let before = task.memory_connections.len();
            task.memory_connections.retain(|c| c.memory_id != memory_id);
            removed = task.memory_connections.len() != before;
            Ok(())
        })
        .await?;
        Ok(removed)
    }

    /// Best-effort removal of `memory_id` from every task's connections.
    ///
    /// Failures are logged and skipped. Returns the number of tasks updated.
    pub async fn prune_memory(&self, memory_id: &str) -> Result<usize, MnemoError> {
        let referencing = self
            .store
            .list::<Task, _>(None, |t| {
                t.memory_connections.iter().any(|c| c.memory_id == memory_id)
            })
            .await?
            .items;
        let mut pruned = 0;
        for task in referencing {
            match self.unlink_memory(&task.id, memory_id).await {
                Ok(_) => pruned += 1,
                Err(e) => warn!(task = %task.id, memory = memory_id, error = %e, "failed to prune memory link"),
            }
        }
        debug!(memory = memory_id, pruned, "pruned memory references");
        Ok(pruned)
    }

    async fn require_parent(&self, parent_id: &str, level: TaskLevel) -> Result<Task, MnemoError> {
        let parent = self.existing_parent(parent_id).await?;
        if parent.level.child_level() != Some(level) {
            return Err(MnemoError::InvalidHierarchy(format!(
                "a {level} cannot be placed under a {} ({parent_id})",
                parent.level
            )));
        }
        Ok(parent)
    }

    async fn existing_parent(&self, parent_id: &str) -> Result<Task, MnemoError> {
        match self.store.read::<Task>(parent_id).await {
            Err(e) if e.is_not_found() => Err(MnemoError::InvalidHierarchy(format!(
                "parent task {parent_id} does not exist"
            ))),
            other => other,
        }
    }

    /// `1 + max(high-water mark, largest existing sibling order)`.
    async fn next_order(&self, project: &str, parent: Option<&Task>) -> Result<u32, MnemoError> {
        let high_water = match parent {
            Some(p) => p.child_sequence,
            None => self.store.read_root_seq(project).await?,
        };
        let max_sibling = self
            .store
            .siblings(project, parent.map(|p| p.id.as_str()))
            .await?
            .iter()
            .map(|t| t.path_order)
            .max()
            .unwrap_or(0);
        Ok(high_water.max(max_sibling) + 1)
    }

    async fn record_order(
        &self,
        project: &str,
        parent: Option<Task>,
        order: u32,
    ) -> Result<(), MnemoError> {
        match parent {
            Some(mut p) => {
                p.child_sequence = p.child_sequence.max(order);
                self.store.write(&p).await?;
            }
            None => {
                let current = self.store.read_root_seq(project).await?;
                self.store
                    .write_root_seq(project, current.max(order))
                    .await?;
            }
        }
        Ok(())
    }

    fn check_path(&self, project: &str, path: &str) -> Result<(), MnemoError> {
        let dir = project_dir(self.store.root(), EntityKind::Task, project);
        validate_path(path, &self.limits.in_dir(&dir)).into_result()
    }

    /// Every task strictly below `task`, in path order.
    async fn descendants(&self, task: &Task) -> Result<Vec<Task>, MnemoError> {
        Ok(self
            .store
            .list::<Task, _>(Some(&task.project), |t| {
                is_descendant_path(&t.path, &task.path)
            })
            .await?
            .items)
    }

    async fn lock(&self, key: String) -> OwnedMutexGuard<()> {
        let mutex = self.locks.entry(key).or_default().clone();
        mutex.lock_owned().await
    }

    /// Locks taken in sorted key order, each key once.
    async fn lock_all(&self, mut keys: Vec<String>) -> Vec<OwnedMutexGuard<()>> {
        keys.sort();
        keys.dedup();
        let mut guards = Vec::with_capacity(keys.len());
        for key in keys {
            guards.push(self.lock(key).await);
        }
        guards
    }

    /// Locks `task`, every task below it and `new_parent_id`, then re-reads
    /// the subtree under those locks.
    ///
    /// A descendant created between the listing and the locking triggers
    /// another round.
    async fn lock_subtree(
        &self,
        task: Task,
        new_parent_id: &str,
    ) -> Result<(Vec<OwnedMutexGuard<()>>, Task, Vec<Task>), MnemoError> {
        let mut snapshot = task;
        for _ in 0..MAX_LOCK_ROUNDS {
            let known: HashSet<String> = self
                .descendants(&snapshot)
                .await?
                .into_iter()
                .map(|t| t.id)
                .collect();
            let mut keys: Vec<String> = known.iter().map(|id| task_key(id)).collect();
            keys.push(task_key(&snapshot.id));
            keys.push(placement_key(&snapshot.project, Some(new_parent_id)));
            let guards = self.lock_all(keys).await;

            let task = self.store.read::<Task>(&snapshot.id).await?;
            let descendants = self.descendants(&task).await?;
            if descendants.iter().all(|d| known.contains(&d.id)) {
                return Ok((guards, task, descendants));
            }
            debug!(id = %task.id, "subtree grew while locking; retrying");
            snapshot = task;
        }
        Err(MnemoError::Internal(format!(
            "subtree of task {} kept changing while locking it for a move",
            snapshot.id
        )))
    }
}

/// Lock serializing `path_order` assignment under one parent.
fn placement_key(project: &str, parent: Option<&str>) -> String {
    match parent {
        Some(id) => task_key(id),
        None => format!("root:{project}"),
    }
}

fn task_key(id: &str) -> String {
    format!("task:{id}")
}

fn level_at(depth: usize) -> Result<TaskLevel, MnemoError> {
    TaskLevel::from_depth(depth).ok_or_else(|| {
        MnemoError::InvalidHierarchy(format!(
            "depth {depth} exceeds {} levels",
            TaskLevel::MAX_DEPTH
        ))
    })
}

fn check_transition(task: &Task, next: TaskStatus) -> Result<(), MnemoError> {
    if task.status.can_transition_to(next) {
        Ok(())
    } else {
        Err(MnemoError::Validation(format!(
            "task {} cannot go from {} to {next}",
            task.id, task.status
        )))
    }
}

/// Nests tasks under their parents. Tasks whose parent is absent become roots.
fn build_tree(tasks: Vec<Task>) -> Vec<TaskNode> {
    let statuses = propagate(&tasks);
    let ids: HashSet<String> = tasks.iter().map(|t| t.id.clone()).collect();

    let mut by_parent: HashMap<Option<String>, Vec<Task>> = HashMap::new();
    for task in tasks {
        let key = task.parent_id.clone().filter(|p| ids.contains(p));
        by_parent.entry(key).or_default().push(task);
    }

    fn attach(
        parent: Option<String>,
        by_parent: &mut HashMap<Option<String>, Vec<Task>>,
        statuses: &HashMap<String, TaskStatus>,
    ) -> Vec<TaskNode> {
        let mut level = by_parent.remove(&parent).unwrap_or_default();
        level.sort_by(|a, b| a.path.cmp(&b.path));
        level
            .into_iter()
            .map(|task| {
                let children = attach(Some(task.id.clone()), by_parent, statuses);
                let effective_status = statuses.get(&task.id).copied().unwrap_or(task.status);
                TaskNode {
                    task,
                    effective_status,
                    children,
                }
            })
            .collect()
    }

    attach(None, &mut by_parent, &statuses)
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn manager() -> (TaskManager, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = EntityStore::new(dir.path());
        store.init().await.unwrap();
        (TaskManager::new(store, PathLimits::default()), dir)
    }

    #[tokio::test]
    async fn master_without_project_goes_to_default() {
        let (tm, _dir) = manager().await;
        let task = tm
            .create_task(NewTask::new("Plan", TaskLevel::Master))
            .await
            .unwrap();
        assert_eq!(task.project, "default");
        assert_eq!(task.path_order, 1);
        assert!(task.memory_connections.is_empty());
    }

    #[tokio::test]
    async fn level_must_match_parent() {
        let (tm, _dir) = manager().await;
        let master = tm
            .create_task(NewTask::new("Plan", TaskLevel::Master))
            .await
            .unwrap();
        let err = tm
            .create_task(NewTask::new("Sub", TaskLevel::Subtask).under(&master.id))
            .await
            .unwrap_err();
        assert!(matches!(err, MnemoError::InvalidHierarchy(_)));
    }

    #[tokio::test]
    async fn missing_parent_is_invalid_hierarchy() {
        let (tm, _dir) = manager().await;
        let err = tm
            .create_task(NewTask::new("Epic", TaskLevel::Epic).under("ghost"))
            .await
            .unwrap_err();
        assert!(matches!(err, MnemoError::InvalidHierarchy(_)));
    }

    #[tokio::test]
    async fn child_inherits_parent_project() {
        let (tm, _dir) = manager().await;
        let master = tm
            .create_task(NewTask::new("Plan", TaskLevel::Master).in_project("alpha"))
            .await
            .unwrap();
        let epic = tm
            .create_task(
                NewTask::new("Epic", TaskLevel::Epic)
                    .under(&master.id)
                    .in_project("beta"),
            )
            .await
            .unwrap();
        assert_eq!(epic.project, "alpha");
        assert!(epic.path.starts_with(&format!("{}.", master.path)));
    }

    #[tokio::test]
    async fn status_transitions_follow_the_state_machine() {
        let (tm, _dir) = manager().await;
        let task = tm
            .create_task(NewTask::new("Plan", TaskLevel::Master))
            .await
            .unwrap();
        let skip = TaskPatch {
            status: Some(TaskStatus::Done),
            ..TaskPatch::default()
        };
        assert!(matches!(
            tm.update_task(&task.id, skip).await.unwrap_err(),
            MnemoError::Validation(_)
        ));

        for next in [TaskStatus::InProgress, TaskStatus::Blocked, TaskStatus::InProgress, TaskStatus::Done] {
            let patch = TaskPatch {
                status: Some(next),
                ..TaskPatch::default()
            };
            assert_eq!(tm.update_task(&task.id, patch).await.unwrap().status, next);
        }
    }

    #[tokio::test]
    async fn title_edit_keeps_the_file() {
        let (tm, _dir) = manager().await;
        let task = tm
            .create_task(NewTask::new("Old title", TaskLevel::Master))
            .await
            .unwrap();
        let patch = TaskPatch {
            title: Some("New title".into()),
            tags: Some(vec!["Ops".into()]),
            ..TaskPatch::default()
        };
        let updated = tm.update_task(&task.id, patch).await.unwrap();
        assert_eq!(updated.title, "New title");
        assert_eq!(updated.path, task.path);
        assert_eq!(updated.tags, vec!["ops"]);
    }

    #[tokio::test]
    async fn explicit_links_come_first_and_unlink_removes() {
        let (tm, _dir) = manager().await;
        let task = tm
            .create_task(NewTask::new("Plan", TaskLevel::Master))
            .await
            .unwrap();
        tm.modify(&task.id, |t| {
            t.memory_connections.push(MemoryConnection {
                memory_id: "m-computed".into(),
                connection_type: ConnectionType::Semantic,
                strength: 0.5,
            });
            Ok(())
        })
        .await
        .unwrap();

        let linked = tm.link_memory_explicit(&task.id, "m-manual").await.unwrap();
        assert_eq!(linked.memory_connections[0].memory_id, "m-manual");
        assert!(linked.has_explicit_link("m-manual"));

        assert!(tm.unlink_memory(&task.id, "m-manual").await.unwrap());
        assert!(!tm.unlink_memory(&task.id, "m-manual").await.unwrap());
    }

    #[test]
    fn filter_matches_fields() {
        let filter = TaskFilter {
            status: Some(TaskStatus::Todo),
            tag: Some("OPS".into()),
            ..TaskFilter::default()
        };
        let mut task = Task::new(
            "t".into(),
            NewTask::new("x", TaskLevel::Master),
            Placement {
                path: "001-x-t0000000".into(),
                path_order: 1,
                slug: "x-t0000000".into(),
            },
            Utc::now(),
        )
        .unwrap();
        task.tags = vec!["ops".into()];
        assert!(filter.matches(&task));
        task.status = TaskStatus::Done;
        assert!(!filter.matches(&task));
    }
}
