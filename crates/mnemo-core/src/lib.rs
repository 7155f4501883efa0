// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Mnemo.
//!
//! Provides the error taxonomy, the Memory and Task records with their
//! validated constructors, project-name sanitization, and the
//! [`SemanticProvider`] trait the linking engine scores through.

pub mod complexity;
pub mod error;
pub mod sanitize;
pub mod traits;
pub mod types;

pub use error::MnemoError;
pub use sanitize::{sanitize_file_stem, sanitize_project, DEFAULT_PROJECT};
pub use traits::SemanticProvider;
pub use types::{
    Category, ConnectionType, EntityKind, Memory, MemoryConnection, MemoryStatus, NewMemory,
    NewTask, Placement, Priority, Task, TaskLevel, TaskStatus,
};
