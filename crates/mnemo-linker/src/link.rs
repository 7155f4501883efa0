// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Materializing scores as stored connections.
//!
//! Every operation replaces the computed part of a connection list from
//! scratch and keeps `explicit` entries untouched, so running it twice
//! produces the same result.

use std::cmp::Ordering;
use std::sync::Arc;

use mnemo_config::LinkingConfig;
use mnemo_core::{ConnectionType, Memory, MemoryConnection, MemoryStatus, MnemoError, Task};
use mnemo_store::EntityStore;
use mnemo_tasks::TaskManager;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::score::{RelevanceEngine, RelevanceScore};

/// Counters returned by batch relinking.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LinkSummary {
    /// Entities visited.
    pub entities: usize,
    /// Entities whose stored connections changed.
    pub updated: usize,
    /// Computed connections present after the run.
    pub connections: usize,
    /// Entities skipped because of an error.
    pub failures: usize,
}

/// Writes relevance links onto tasks and memories.
pub struct Linker {
    engine: Arc<RelevanceEngine>,
    store: EntityStore,
    tasks: Arc<TaskManager>,
    max_connections: usize,
    max_related: usize,
}

impl Linker {
    pub fn new(
        engine: Arc<RelevanceEngine>,
        store: EntityStore,
        tasks: Arc<TaskManager>,
        config: &LinkingConfig,
    ) -> Self {
        Self {
            engine,
            store,
            tasks,
            max_connections: config.max_connections,
            max_related: config.max_related_memories,
        }
    }

    pub fn engine(&self) -> &RelevanceEngine {
        &self.engine
    }

    /// Recomputes the connections of one task against every active memory.
    pub async fn link_task(&self, task_id: &str) -> Result<Task, MnemoError> {
        let memories = self.active_memories().await?;
        let task = self.tasks.get_task(task_id).await?;
        self.link_task_against(task, &memories).await.map(|(task, _)| task)
    }

    /// Updates every task's connection to `memory_id`, then the memory's
    /// related memories.
    pub async fn link_memory(&self, memory_id: &str) -> Result<Memory, MnemoError> {
        let memory = self.store.read::<Memory>(memory_id).await?;
        let tasks = self.store.list::<Task, _>(None, |_| true).await?.items;

        let mut updated = 0;
        for task in tasks {
            if task.has_explicit_link(memory_id) {
                continue;
            }
            let desired = if memory.status == MemoryStatus::Active {
                let score = self.engine.score(&task, &memory).await;
                self.engine
                    .is_relevant(&score)
                    .then(|| self.connection(memory_id, &score))
            } else {
                None
            };
            let current = task
                .memory_connections
                .iter()
                .find(|c| c.memory_id == memory_id);
            if current == desired.as_ref() {
                continue;
            }

            let cap = self.max_connections;
            let result = self
                .tasks
                .modify(&task.id, |t| {
                    if t.has_explicit_link(memory_id) {
                        return Ok(());
                    }
                    let mut computed: Vec<MemoryConnection> = t
                        .memory_connections
                        .iter()
                        .filter(|c| {
                            c.connection_type != ConnectionType::Explicit
                                && c.memory_id != memory_id
                        })
                        .cloned()
                        .collect();
                    computed.extend(desired);
                    computed.sort_by(by_strength);
                    computed.truncate(cap);
                    t.memory_connections = merge_explicit(&t.memory_connections, computed);
                    Ok(())
                })
                .await;
            match result {
                Ok(_) => updated += 1,
                Err(e) if e.is_not_found() => continue,
                Err(e) => return Err(e),
            }
        }
        debug!(memory = memory_id, tasks_updated = updated, "linked memory to tasks");

        let others = self.active_memories().await?;
        self.relate_memory(memory, &others).await.map(|(memory, _)| memory)
    }

    /// Recomputes every task's connections. Per-task errors are logged and
    /// counted; the run continues.
    pub async fn relink_all_tasks(&self) -> Result<LinkSummary, MnemoError> {
        let memories = self.active_memories().await?;
        let tasks = self.store.list::<Task, _>(None, |_| true).await?.items;
        let mut summary = LinkSummary::default();

        for task in tasks {
            summary.entities += 1;
            let id = task.id.clone();
            match self.link_task_against(task, &memories).await {
                Ok((task, changed)) => {
                    summary.updated += usize::from(changed);
                    summary.connections += task
                        .memory_connections
                        .iter()
                        .filter(|c| c.connection_type != ConnectionType::Explicit)
                        .count();
                }
                Err(e) => {
                    summary.failures += 1;
                    warn!(task = %id, error = %e, "relink failed");
                }
            }
        }
        info!(
            tasks = summary.entities,
            updated = summary.updated,
            connections = summary.connections,
            failures = summary.failures,
            "relinked all tasks"
        );
        Ok(summary)
    }

    /// Recomputes `related_memory_ids` of every memory.
    pub async fn relink_all_memories(&self) -> Result<LinkSummary, MnemoError> {
        let memories = self.store.list::<Memory, _>(None, |_| true).await?.items;
        let active: Vec<Memory> = memories
            .iter()
            .filter(|m| m.status == MemoryStatus::Active)
            .cloned()
            .collect();
        let mut summary = LinkSummary::default();

        for memory in memories {
            summary.entities += 1;
            let id = memory.id.clone();
            match self.relate_memory(memory, &active).await {
                Ok((memory, changed)) => {
                    summary.updated += usize::from(changed);
                    summary.connections += memory.related_memory_ids.len();
                }
                Err(e) => {
                    summary.failures += 1;
                    warn!(memory = %id, error = %e, "relink failed");
                }
            }
        }
        info!(
            memories = summary.entities,
            updated = summary.updated,
            related = summary.connections,
            failures = summary.failures,
            "relinked all memories"
        );
        Ok(summary)
    }

    async fn link_task_against(
        &self,
        task: Task,
        memories: &[Memory],
    ) -> Result<(Task, bool), MnemoError> {
        let mut computed = Vec::new();
        for memory in memories {
            if task.has_explicit_link(&memory.id) {
                continue;
            }
            let score = self.engine.score(&task, memory).await;
            if self.engine.is_relevant(&score) {
                computed.push(self.connection(&memory.id, &score));
            }
        }
        computed.sort_by(by_strength);
        computed.truncate(self.max_connections);

        if merge_explicit(&task.memory_connections, computed.clone()) == task.memory_connections {
            return Ok((task, false));
        }

        let updated = self
            .tasks
            .modify(&task.id, |t| {
                t.memory_connections = merge_explicit(&t.memory_connections, computed);
                Ok(())
            })
            .await?;
        debug!(
            task = %updated.id,
            connections = updated.memory_connections.len(),
            "task links updated"
        );
        Ok((updated, true))
    }

    /// Sets `related_memory_ids` of `memory` from the other active memories.
    async fn relate_memory(
        &self,
        mut memory: Memory,
        candidates: &[Memory],
    ) -> Result<(Memory, bool), MnemoError> {
        let mut scored: Vec<(f64, &str)> = Vec::new();
        if memory.status == MemoryStatus::Active {
            for other in candidates.iter().filter(|m| m.id != memory.id) {
                let score = self.engine.score_memories(&memory, other).await;
                if self.engine.is_relevant(&score) {
                    scored.push((score.total, &other.id));
                }
            }
        }
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(b.1)));
        let related: Vec<String> = scored
            .into_iter()
            .take(self.max_related)
            .map(|(_, id)| id.to_string())
            .collect();

        if related == memory.related_memory_ids {
            return Ok((memory, false));
        }
        memory.related_memory_ids = related;
        self.store.write(&memory).await?;
        debug!(memory = %memory.id, related = memory.related_memory_ids.len(), "related memories updated");
        Ok((memory, true))
    }

    async fn active_memories(&self) -> Result<Vec<Memory>, MnemoError> {
        Ok(self
            .store
            .list::<Memory, _>(None, |m| m.status == MemoryStatus::Active)
            .await?
            .items)
    }

    fn connection(&self, memory_id: &str, score: &RelevanceScore) -> MemoryConnection {
        MemoryConnection {
            memory_id: memory_id.to_string(),
            connection_type: self.engine.classify(score, false),
            strength: score.total,
        }
    }
}

/// Explicit entries of `current` followed by `computed` minus any memory
/// already linked explicitly.
fn merge_explicit(current: &[MemoryConnection], computed: Vec<MemoryConnection>) -> Vec<MemoryConnection> {
    let mut merged: Vec<MemoryConnection> = current
        .iter()
        .filter(|c| c.connection_type == ConnectionType::Explicit)
        .cloned()
        .collect();
    for connection in computed {
        if !merged.iter().any(|c| c.memory_id == connection.memory_id) {
            merged.push(connection);
        }
    }
    merged
}

/// Strongest first; ties by memory id so output is deterministic.
fn by_strength(a: &MemoryConnection, b: &MemoryConnection) -> Ordering {
    b.strength
        .total_cmp(&a.strength)
        .then_with(|| a.memory_id.cmp(&b.memory_id))
}
