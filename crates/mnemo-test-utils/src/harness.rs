// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness: a temporary storage root with the lower layers wired up.
//!
//! The harness owns the [`tempfile::TempDir`]; everything is removed when it
//! is dropped.

use std::path::Path;
use std::sync::Arc;

use mnemo_config::MnemoConfig;
use mnemo_core::{MnemoError, NewTask, Task, TaskLevel};
use mnemo_store::EntityStore;
use mnemo_tasks::{PathLimits, TaskManager};

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    threshold: Option<f64>,
    max_path_length: Option<usize>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            threshold: None,
            max_path_length: None,
        }
    }

    /// Override `linking.relevance_threshold`.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    /// Override `storage.max_path_length`.
    pub fn with_max_path_length(mut self, max: usize) -> Self {
        self.max_path_length = Some(max);
        self
    }

    pub async fn build(self) -> Result<TestHarness, MnemoError> {
        let temp_dir = tempfile::TempDir::new()
            .map_err(|e| MnemoError::io(std::env::temp_dir(), e))?;

        let mut config = MnemoConfig::with_root(temp_dir.path());
        if let Some(threshold) = self.threshold {
            config.linking.relevance_threshold = threshold;
        }
        if let Some(max) = self.max_path_length {
            config.storage.max_path_length = max;
        }

        let store = EntityStore::new(temp_dir.path());
        store.init().await?;
        let tasks = Arc::new(TaskManager::new(
            store.clone(),
            PathLimits::from_config(&config.storage),
        ));

        Ok(TestHarness {
            config,
            store,
            tasks,
            _temp_dir: temp_dir,
        })
    }
}

/// A temporary Mnemo storage root.
pub struct TestHarness {
    pub config: MnemoConfig,
    pub store: EntityStore,
    pub tasks: Arc<TaskManager>,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness with default configuration.
    pub async fn new() -> Result<Self, MnemoError> {
        Self::builder().build().await
    }

    pub fn root(&self) -> &Path {
        self.store.root()
    }

    /// Creates master, epic, task and subtask in `project`, returned in that order.
    pub async fn seed_chain(&self, project: &str) -> Result<[Task; 4], MnemoError> {
        let master = self
            .tasks
            .create_task(NewTask::new("Launch plan", TaskLevel::Master).in_project(project))
            .await?;
        let epic = self
            .tasks
            .create_task(NewTask::new("Checkout flow", TaskLevel::Epic).under(&master.id))
            .await?;
        let task = self
            .tasks
            .create_task(NewTask::new("Payment form", TaskLevel::Task).under(&epic.id))
            .await?;
        let subtask = self
            .tasks
            .create_task(NewTask::new("Validate card number", TaskLevel::Subtask).under(&task.id))
            .await?;
        Ok([master, epic, task, subtask])
    }
}
