// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory operations of [`Mnemo`].

use std::sync::Arc;

use chrono::Utc;
use mnemo_core::types::normalize_tags;
use mnemo_core::{
    Category, Memory, MemoryStatus, MnemoError, NewMemory, Priority, sanitize_project,
};
use mnemo_linker::infer_category;
use mnemo_query::{Ranked, detect_complexity, rank_results};
use tracing::{debug, info, warn};

use crate::service::Mnemo;

/// Field edits for [`Mnemo::update_memory`]. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct MemoryPatch {
    /// New content. The complexity tier is re-detected unless `complexity`
    /// is also given.
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub category: Option<Category>,
    /// Moves the memory file to another project directory.
    pub project: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<MemoryStatus>,
    pub complexity: Option<u8>,
}

impl MemoryPatch {
    fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.tags.is_none()
            && self.category.is_none()
            && self.project.is_none()
            && self.priority.is_none()
            && self.status.is_none()
            && self.complexity.is_none()
    }
}

/// Criteria for [`Mnemo::list_memories`]. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilter {
    pub project: Option<String>,
    pub category: Option<Category>,
    pub status: Option<MemoryStatus>,
    pub tag: Option<String>,
}

impl MemoryFilter {
    pub fn matches(&self, memory: &Memory) -> bool {
        self.category.is_none_or(|c| memory.category == c)
            && self.status.is_none_or(|s| memory.status == s)
            && self
                .tag
                .as_deref()
                .is_none_or(|tag| memory.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }
}

impl Mnemo {
    /// Stores a new memory and, if enabled, links it in the background.
    ///
    /// Without an explicit category one is inferred from content and tags.
    pub async fn create_memory(&self, mut input: NewMemory) -> Result<Memory, MnemoError> {
        if input.category.is_none() {
            input.category = Some(self.infer_category(&input.content, &input.tags));
        }
        if let Some(id) = input.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
            && self.store.locate::<Memory>(id).await?.is_some()
        {
            return Err(MnemoError::Validation(format!(
                "a memory with id {id} already exists"
            )));
        }

        let memory = Memory::new(input, Utc::now())?;
        let target = self.store.entity_path(&memory);
        if tokio::fs::try_exists(&target)
            .await
            .map_err(|e| MnemoError::io(&target, e))?
        {
            return Err(MnemoError::Validation(format!(
                "memory file {} already exists",
                target.display()
            )));
        }
        self.store.write(&memory).await?;
        info!(
            memory = %memory.id,
            project = %memory.project,
            category = %memory.category,
            complexity = memory.complexity,
            "memory created"
        );
        if self.config.linking.link_on_create {
            self.spawn_memory_link(&memory.id).await;
        }
        Ok(memory)
    }

    /// Reads a memory and records the access.
    pub async fn get_memory(&self, id: &str) -> Result<Memory, MnemoError> {
        let mut memory = self.store.read::<Memory>(id).await?;
        memory.accessed_at = Utc::now();
        if let Err(e) = self.store.write(&memory).await {
            warn!(memory = id, error = %e, "failed to record memory access");
        }
        Ok(memory)
    }

    /// Applies `patch` and relinks the memory when anything changed.
    pub async fn update_memory(&self, id: &str, patch: MemoryPatch) -> Result<Memory, MnemoError> {
        let previous = self.store.read::<Memory>(id).await?;
        if patch.is_empty() {
            return Ok(previous);
        }

        let mut memory = previous.clone();
        if let Some(content) = patch.content {
            let content = content.trim().to_string();
            if content.is_empty() {
                return Err(MnemoError::Validation(
                    "memory content must not be empty".to_string(),
                ));
            }
            memory.complexity = detect_complexity(&content);
            memory.content = content;
        }
        if let Some(tier) = patch.complexity {
            if !(1..=4).contains(&tier) {
                return Err(MnemoError::Validation(format!(
                    "memory complexity must be between 1 and 4, got {tier}"
                )));
            }
            memory.complexity = tier;
        }
        if let Some(tags) = patch.tags {
            memory.tags = normalize_tags(tags);
        }
        if let Some(category) = patch.category {
            memory.category = category;
        }
        if let Some(project) = patch.project {
            memory.project = sanitize_project(&project);
        }
        if let Some(priority) = patch.priority {
            memory.priority = priority;
        }
        if let Some(status) = patch.status {
            memory.status = status;
        }
        memory.updated_at = Utc::now();

        if memory.project != previous.project {
            self.store.replace(&previous, &memory).await?;
        } else {
            self.store.write(&memory).await?;
        }
        debug!(memory = id, "memory updated");
        self.spawn_memory_link(id).await;
        Ok(memory)
    }

    /// Deletes a memory and prunes task connections to it.
    ///
    /// Related-memory references held by other memories are left in place.
    pub async fn delete_memory(&self, id: &str) -> Result<Memory, MnemoError> {
        let memory = self.store.delete::<Memory>(id).await?;
        match self.tasks.prune_memory(id).await {
            Ok(pruned) => info!(memory = id, pruned, "memory deleted"),
            Err(e) => warn!(memory = id, error = %e, "memory deleted but task links were not pruned"),
        }
        Ok(memory)
    }

    pub async fn list_memories(&self, filter: &MemoryFilter) -> Result<Vec<Memory>, MnemoError> {
        let project = filter.project.as_deref().map(sanitize_project);
        let mut memories = self
            .store
            .list::<Memory, _>(project.as_deref(), |m| filter.matches(m))
            .await?
            .items;
        memories.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.id.cmp(&b.id)));
        Ok(memories)
    }

    /// Memories matching `query` or any of its expansions, best first.
    /// Archived memories are excluded.
    pub async fn search_memories(
        &self,
        query: &str,
        project: Option<&str>,
    ) -> Result<Vec<Ranked<Memory>>, MnemoError> {
        let terms = self.expander.expand_query(query);
        let candidates = self
            .list_memories(&MemoryFilter {
                project: project.map(str::to_string),
                status: Some(MemoryStatus::Active),
                ..MemoryFilter::default()
            })
            .await?;
        let ranked: Vec<Ranked<Memory>> = rank_results(candidates, query, &terms, Utc::now())
            .into_iter()
            .filter(|r| r.matched)
            .collect();
        debug!(query, terms = terms.len(), hits = ranked.len(), "memory search");
        Ok(ranked)
    }

    fn infer_category(&self, content: &str, tags: &[String]) -> Category {
        let mut tokens = self.expander.tokenize(content);
        tokens.extend(tags.iter().map(|t| t.to_lowercase()));
        infer_category(tokens.iter().map(String::as_str))
    }

    async fn spawn_memory_link(&self, id: &str) {
        let linker = Arc::clone(&self.linker);
        let id = id.to_string();
        self.jobs
            .spawn(async move {
                if let Err(e) = linker.link_memory(&id).await {
                    if e.is_not_found() {
                        debug!(memory = %id, "memory gone before linking");
                    } else {
                        warn!(memory = %id, error = %e, "background memory linking failed");
                    }
                }
            })
            .await;
    }
}
