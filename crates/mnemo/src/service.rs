// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The `Mnemo` service: tasks, linking and durability behind one handle.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use mnemo_config::MnemoConfig;
use mnemo_core::{Memory, MemoryConnection, MnemoError, NewTask, SemanticProvider, Task, TaskStatus};
use mnemo_durability::{BackupHandle, Durability, HealthReport, RestoreReport};
use mnemo_linker::{LinkSummary, Linker, RelevanceEngine};
use mnemo_query::{QueryExpander, Ranked, rank_results};
use mnemo_store::EntityStore;
use mnemo_tasks::{DeleteOptions, PathLimits, TaskFilter, TaskManager, TaskNode, TaskPatch};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::jobs::LinkJobs;

/// Label of the backup taken before a cascade delete.
pub const CASCADE_BACKUP_LABEL: &str = "pre-cascade-delete";

/// A task connection with its memory resolved.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConnection {
    pub memory: Memory,
    pub connection: MemoryConnection,
}

/// A task that links to a given memory.
#[derive(Debug, Clone, Serialize)]
pub struct Backlink {
    pub task: Task,
    pub connection: MemoryConnection,
}

/// Result of [`Mnemo::relink_all`].
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RelinkSummary {
    pub tasks: LinkSummary,
    pub memories: LinkSummary,
}

/// Handle to one storage root.
pub struct Mnemo {
    pub(crate) config: MnemoConfig,
    pub(crate) store: EntityStore,
    pub(crate) tasks: Arc<TaskManager>,
    pub(crate) linker: Arc<Linker>,
    pub(crate) expander: Arc<QueryExpander>,
    durability: Durability,
    pub(crate) jobs: LinkJobs,
}

impl Mnemo {
    /// Opens (and initializes) the storage root named by `config`, scoring
    /// semantics by lexical overlap.
    pub async fn open(config: MnemoConfig) -> Result<Self, MnemoError> {
        Self::open_with_provider(config, None).await
    }

    /// Like [`open`](Self::open), with a semantic similarity provider.
    pub async fn open_with_provider(
        config: MnemoConfig,
        provider: Option<Arc<dyn SemanticProvider>>,
    ) -> Result<Self, MnemoError> {
        let store = EntityStore::new(config.root_dir());
        store.init().await?;

        let expander = Arc::new(QueryExpander::from_config(&config.query));
        let mut engine = RelevanceEngine::new(Arc::clone(&expander), &config.linking);
        if let Some(provider) = provider {
            engine = engine.with_provider(provider);
        }
        let tasks = Arc::new(TaskManager::new(
            store.clone(),
            PathLimits::from_config(&config.storage),
        ));
        let linker = Arc::new(Linker::new(
            Arc::new(engine),
            store.clone(),
            Arc::clone(&tasks),
            &config.linking,
        ));
        let durability = Durability::from_config(store.clone(), &config);

        info!(root = %store.root().display(), "mnemo storage opened");
        Ok(Self {
            config,
            store,
            tasks,
            linker,
            expander,
            durability,
            jobs: LinkJobs::default(),
        })
    }

    pub fn config(&self) -> &MnemoConfig {
        &self.config
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    // Tasks

    /// Creates a task and, if enabled, links it in the background.
    ///
    /// The returned task has no connections yet; see [`flush_links`](Self::flush_links).
    pub async fn create_task(&self, input: NewTask) -> Result<Task, MnemoError> {
        let task = self.tasks.create_task(input).await?;
        if self.config.linking.link_on_create {
            let linker = Arc::clone(&self.linker);
            let id = task.id.clone();
            self.jobs
                .spawn(async move {
                    if let Err(e) = linker.link_task(&id).await {
                        warn!(task = %id, error = %e, "background task linking failed");
                    }
                })
                .await;
        }
        Ok(task)
    }

    pub async fn get_task(&self, id: &str) -> Result<Task, MnemoError> {
        self.tasks.get_task(id).await
    }

    pub async fn update_task(&self, id: &str, patch: TaskPatch) -> Result<Task, MnemoError> {
        self.tasks.update_task(id, patch).await
    }

    /// Deletes a task; with `cascade`, its subtree too, after a backup.
    pub async fn delete_task(&self, id: &str, cascade: bool) -> Result<Vec<String>, MnemoError> {
        if cascade && !self.tasks.children(id).await?.is_empty() {
            self.durability.backup(CASCADE_BACKUP_LABEL).await?;
        }
        self.tasks.delete_task(id, DeleteOptions { cascade }).await
    }

    pub async fn list_tasks(&self, filter: &TaskFilter) -> Result<Vec<Task>, MnemoError> {
        self.tasks.list_tasks(filter).await
    }

    pub async fn task_tree(&self, project: Option<&str>) -> Result<Vec<TaskNode>, MnemoError> {
        self.tasks.tree(project).await
    }

    /// Effective (propagated) status of a task.
    pub async fn task_status(&self, id: &str) -> Result<TaskStatus, MnemoError> {
        self.tasks.compute_status_propagation(id).await
    }

    /// Tasks matching `query` or any of its expansions, best first.
    pub async fn search_tasks(
        &self,
        query: &str,
        project: Option<&str>,
    ) -> Result<Vec<Ranked<Task>>, MnemoError> {
        let terms = self.expander.expand_query(query);
        let candidates = self
            .tasks
            .list_tasks(&TaskFilter {
                project: project.map(str::to_string),
                ..TaskFilter::default()
            })
            .await?;
        let ranked: Vec<Ranked<Task>> = rank_results(candidates, query, &terms, Utc::now())
            .into_iter()
            .filter(|r| r.matched)
            .collect();
        debug!(query, terms = terms.len(), hits = ranked.len(), "task search");
        Ok(ranked)
    }

    // Linking

    pub async fn relink_task(&self, id: &str) -> Result<Task, MnemoError> {
        self.linker.link_task(id).await
    }

    pub async fn relink_memory(&self, id: &str) -> Result<Memory, MnemoError> {
        self.linker.link_memory(id).await
    }

    /// Recomputes every computed connection and related-memory list.
    pub async fn relink_all(&self) -> Result<RelinkSummary, MnemoError> {
        let tasks = self.linker.relink_all_tasks().await?;
        let memories = self.linker.relink_all_memories().await?;
        Ok(RelinkSummary { tasks, memories })
    }

    /// Connections of a task whose memory still exists. Dangling entries
    /// are pruned as they are found.
    pub async fn connections_for_task(
        &self,
        task_id: &str,
    ) -> Result<Vec<ResolvedConnection>, MnemoError> {
        let task = self.tasks.get_task(task_id).await?;
        let mut resolved = Vec::with_capacity(task.memory_connections.len());
        for connection in task.memory_connections {
            let read = self.store.read::<Memory>(&connection.memory_id).await;
            match read {
                Ok(memory) => resolved.push(ResolvedConnection { memory, connection }),
                Err(e) if e.is_not_found() => {
                    debug!(task = task_id, memory = %connection.memory_id, "pruning dangling connection");
                    if let Err(e) = self.tasks.unlink_memory(task_id, &connection.memory_id).await {
                        warn!(task = task_id, error = %e, "failed to prune dangling connection");
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(resolved)
    }

    /// Tasks linking to `memory_id`, strongest first.
    pub async fn connections_for_memory(&self, memory_id: &str) -> Result<Vec<Backlink>, MnemoError> {
        self.store.read::<Memory>(memory_id).await?;
        let tasks = self
            .tasks
            .list_tasks(&TaskFilter::default())
            .await?;
        let mut backlinks: Vec<Backlink> = tasks
            .into_iter()
            .filter_map(|task| {
                let connection = task
                    .memory_connections
                    .iter()
                    .find(|c| c.memory_id == memory_id)?
                    .clone();
                Some(Backlink { task, connection })
            })
            .collect();
        backlinks.sort_by(|a, b| b.connection.strength.total_cmp(&a.connection.strength));
        Ok(backlinks)
    }

    /// Manually links a task to an existing memory.
    pub async fn link_explicit(&self, task_id: &str, memory_id: &str) -> Result<Task, MnemoError> {
        self.store.read::<Memory>(memory_id).await?;
        self.tasks.link_memory_explicit(task_id, memory_id).await
    }

    /// Removes any link between a task and a memory.
    pub async fn unlink(&self, task_id: &str, memory_id: &str) -> Result<bool, MnemoError> {
        self.tasks.unlink_memory(task_id, memory_id).await
    }

    /// Waits for background linking started by creates. Returns the number
    /// of jobs awaited.
    pub async fn flush_links(&self) -> usize {
        self.jobs.flush().await
    }

    /// Background link jobs not yet reaped.
    pub async fn pending_links(&self) -> usize {
        self.jobs.pending().await
    }

    // Durability

    pub async fn backup(&self, label: &str) -> Result<BackupHandle, MnemoError> {
        let handle = self.durability.backup(label).await?;
        if let Err(e) = self.durability.prune_to_retention().await {
            warn!(error = %e, "backup retention pruning failed");
        }
        Ok(handle)
    }

    /// Replaces live data with `handle`'s. Outstanding link jobs finish first.
    pub async fn restore(&self, handle: &BackupHandle) -> Result<RestoreReport, MnemoError> {
        self.flush_links().await;
        self.durability.restore(handle).await
    }

    /// Opens a backup directory for [`restore`](Self::restore).
    pub async fn open_backup(&self, path: impl Into<PathBuf>) -> Result<BackupHandle, MnemoError> {
        self.durability.open_backup(&path.into()).await
    }

    pub async fn health_check(&self) -> Result<HealthReport, MnemoError> {
        self.durability.health_check().await
    }

    pub async fn cleanup_orphans(&self) -> Result<usize, MnemoError> {
        self.durability.cleanup_orphans().await
    }

    pub async fn list_backups(&self) -> Result<Vec<BackupHandle>, MnemoError> {
        self.durability.list_backups().await
    }

    pub async fn prune_backups(&self, keep: usize) -> Result<Vec<PathBuf>, MnemoError> {
        self.durability.prune_backups(keep).await
    }
}
