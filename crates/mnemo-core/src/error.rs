// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types shared by every Mnemo crate.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::EntityKind;

/// The primary error type used across the store, task manager, linker and durability layer.
#[derive(Debug, Error)]
pub enum MnemoError {
    /// A required field is missing or invalid. Raised before any write happens.
    #[error("validation error: {0}")]
    Validation(String),

    /// Level/parent mismatch, cycle attempt, or a delete that would orphan children.
    #[error("invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// No entity with the given id exists.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// An entity file could not be parsed.
    ///
    /// Bulk scans report this instead of returning it.
    #[error("corrupt entity file {}: {reason}", path.display())]
    Corrupt { path: PathBuf, reason: String },

    /// Filesystem failure, surfaced verbatim with the offending path.
    #[error("i/o failure at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The semantic similarity provider is unavailable.
    ///
    /// The linker logs this and falls back to lexical scoring; it is never
    /// returned from a public operation.
    #[error("semantic scoring degraded: {0}")]
    DegradedScoring(String),

    /// Configuration errors that survive loading (e.g. unusable storage root).
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors (serialization of a well-formed record, joins).
    #[error("internal error: {0}")]
    Internal(String),
}

impl MnemoError {
    /// Wraps an I/O error together with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MnemoError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn not_found(kind: EntityKind, id: impl Into<String>) -> Self {
        MnemoError::NotFound {
            kind,
            id: id.into(),
        }
    }

    /// True for the `NotFound` variant.
    pub fn is_not_found(&self) -> bool {
        matches!(self, MnemoError::NotFound { .. })
    }
}
