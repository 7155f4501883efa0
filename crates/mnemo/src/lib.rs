// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mnemo: file-backed memories and hierarchical tasks, linked by relevance.
//!
//! [`Mnemo`] is the entry point. It owns one storage root and exposes task,
//! memory, linking and durability operations over it:
//!
//! ```no_run
//! # async fn run() -> Result<(), mnemo::MnemoError> {
//! use mnemo::{Mnemo, MnemoConfig, NewMemory, NewTask, TaskLevel};
//!
//! let mnemo = Mnemo::open(MnemoConfig::with_root("/tmp/mnemo")).await?;
//! mnemo.create_memory(NewMemory::new("Stripe webhooks need idempotency keys")).await?;
//! let master = mnemo
//!     .create_task(NewTask::new("Payments", TaskLevel::Master).in_project("shop"))
//!     .await?;
//! mnemo.flush_links().await;
//! let linked = mnemo.connections_for_task(&master.id).await?;
//! # let _ = linked;
//! # Ok(())
//! # }
//! ```

mod jobs;
pub mod memories;
pub mod service;

pub use memories::{MemoryFilter, MemoryPatch};
pub use service::{Backlink, CASCADE_BACKUP_LABEL, Mnemo, RelinkSummary, ResolvedConnection};

pub use mnemo_config::MnemoConfig;
pub use mnemo_core::{
    Category, ConnectionType, Memory, MemoryConnection, MemoryStatus, MnemoError, NewMemory,
    NewTask, Priority, SemanticProvider, Task, TaskLevel, TaskStatus,
};
pub use mnemo_durability::{BackupHandle, HealthReport, HealthStatus, RestoreReport};
pub use mnemo_linker::LinkSummary;
pub use mnemo_query::Ranked;
pub use mnemo_tasks::{TaskFilter, TaskNode, TaskPatch};
