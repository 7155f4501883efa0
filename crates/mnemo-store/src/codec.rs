// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity file codec.
//!
//! An entity file is a TOML header between `+++` fences followed by the
//! body text (memory content or task description):
//!
//! ```text
//! +++
//! id = "3f2b9c1e-..."
//! project = "mnemo"
//! +++
//! body
//! ```

use std::path::Path;

use chrono::{DateTime, Utc};
use mnemo_core::{
    Category, ConnectionType, EntityKind, Memory, MemoryConnection, MemoryStatus, MnemoError,
    Priority, Task, TaskLevel, TaskStatus,
};
use serde::{Deserialize, Serialize};

use crate::layout::{memory_file_name, task_file_name};

pub const FENCE: &str = "+++";

/// A record the store can persist.
pub trait Entity: Sized + Send + Sync + 'static {
    const KIND: EntityKind;

    fn id(&self) -> &str;

    /// Sanitized project the entity is filed under.
    fn project(&self) -> &str;

    /// File name inside the project directory.
    fn file_name(&self) -> String;

    fn encode(&self) -> Result<String, MnemoError>;

    /// Decodes file contents; `path` only labels errors.
    fn decode(text: &str, path: &Path) -> Result<Self, MnemoError>;
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct MemoryHeader {
    id: String,
    project: String,
    category: Category,
    priority: Priority,
    status: MemoryStatus,
    complexity: u8,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    related_memory_ids: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    accessed_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskHeader {
    id: String,
    title: String,
    level: TaskLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parent_id: Option<String>,
    path: String,
    path_order: u32,
    slug: String,
    #[serde(default)]
    child_sequence: u32,
    status: TaskStatus,
    priority: Priority,
    project: String,
    #[serde(default)]
    tags: Vec<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    memory_connections: Vec<ConnectionRecord>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConnectionRecord {
    memory_id: String,
    #[serde(rename = "type")]
    connection_type: ConnectionType,
    strength: f64,
}

impl Entity for Memory {
    const KIND: EntityKind = EntityKind::Memory;

    fn id(&self) -> &str {
        &self.id
    }

    fn project(&self) -> &str {
        &self.project
    }

    fn file_name(&self) -> String {
        memory_file_name(&self.id)
    }

    fn encode(&self) -> Result<String, MnemoError> {
        let header = MemoryHeader {
            id: self.id.clone(),
            project: self.project.clone(),
            category: self.category,
            priority: self.priority,
            status: self.status,
            complexity: self.complexity,
            tags: self.tags.clone(),
            related_memory_ids: self.related_memory_ids.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            accessed_at: self.accessed_at,
        };
        render(&header, &self.content)
    }

    fn decode(text: &str, path: &Path) -> Result<Self, MnemoError> {
        let (header, body): (MemoryHeader, &str) = parse(text, path)?;
        if body.trim().is_empty() {
            return Err(corrupt(path, "memory content is empty"));
        }
        if !(1..=4).contains(&header.complexity) {
            return Err(corrupt(
                path,
                format!("complexity {} is out of range", header.complexity),
            ));
        }
        Ok(Memory {
            id: header.id,
            content: body.to_string(),
            tags: header.tags,
            category: header.category,
            project: header.project,
            priority: header.priority,
            status: header.status,
            complexity: header.complexity,
            related_memory_ids: header.related_memory_ids,
            created_at: header.created_at,
            updated_at: header.updated_at,
            accessed_at: header.accessed_at,
        })
    }
}

impl Entity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> &str {
        &self.id
    }

    fn project(&self) -> &str {
        &self.project
    }

    fn file_name(&self) -> String {
        task_file_name(&self.path)
    }

    fn encode(&self) -> Result<String, MnemoError> {
        let header = TaskHeader {
            id: self.id.clone(),
            title: self.title.clone(),
            level: self.level,
            parent_id: self.parent_id.clone(),
            path: self.path.clone(),
            path_order: self.path_order,
            slug: self.slug.clone(),
            child_sequence: self.child_sequence,
            status: self.status,
            priority: self.priority,
            project: self.project.clone(),
            tags: self.tags.clone(),
            created_at: self.created_at,
            updated_at: self.updated_at,
            memory_connections: self
                .memory_connections
                .iter()
                .map(|c| ConnectionRecord {
                    memory_id: c.memory_id.clone(),
                    connection_type: c.connection_type,
                    strength: c.strength,
                })
                .collect(),
        };
        render(&header, &self.description)
    }

    fn decode(text: &str, path: &Path) -> Result<Self, MnemoError> {
        let (header, body): (TaskHeader, &str) = parse(text, path)?;
        if header.title.trim().is_empty() {
            return Err(corrupt(path, "task title is empty"));
        }
        if header.parent_id.is_some() == (header.level == TaskLevel::Master) {
            return Err(corrupt(
                path,
                format!("{} task has inconsistent parent", header.level),
            ));
        }
        Ok(Task {
            id: header.id,
            title: header.title,
            description: body.to_string(),
            level: header.level,
            parent_id: header.parent_id,
            path: header.path,
            path_order: header.path_order,
            slug: header.slug,
            child_sequence: header.child_sequence,
            status: header.status,
            priority: header.priority,
            project: header.project,
            tags: header.tags,
            memory_connections: header
                .memory_connections
                .into_iter()
                .map(|c| MemoryConnection {
                    memory_id: c.memory_id,
                    connection_type: c.connection_type,
                    strength: c.strength,
                })
                .collect(),
            created_at: header.created_at,
            updated_at: header.updated_at,
        })
    }
}

fn render<H: Serialize>(header: &H, body: &str) -> Result<String, MnemoError> {
    let header = toml::to_string(header)
        .map_err(|e| MnemoError::Internal(format!("failed to encode entity header: {e}")))?;
    Ok(format!("{FENCE}\n{header}{FENCE}\n{body}"))
}

fn parse<'a, H: for<'de> Deserialize<'de>>(
    text: &'a str,
    path: &Path,
) -> Result<(H, &'a str), MnemoError> {
    let (header, body) = split_header(text).ok_or_else(|| corrupt(path, "missing +++ header"))?;
    let header = toml::from_str(header).map_err(|e| corrupt(path, e.message()))?;
    Ok((header, body))
}

/// Splits file contents into header and body. `None` when the fences are absent.
///
/// The closing fence is the first `+++` line that ends a well-formed TOML
/// header; a `+++` line inside a multi-line string does not close it. When no
/// candidate parses, the first one is returned so decoding reports the TOML
/// error.
pub fn split_header(text: &str) -> Option<(&str, &str)> {
    let rest = text.strip_prefix(FENCE)?;
    let rest = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))?;

    let mut offset = 0;
    let mut first = None;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == FENCE {
            let header = &rest[..offset];
            let body = &rest[offset + line.len()..];
            if toml::from_str::<toml::Table>(header).is_ok() {
                return Some((header, body));
            }
            first.get_or_insert((header, body));
        }
        offset += line.len();
    }
    first
}

fn corrupt(path: &Path, reason: impl Into<String>) -> MnemoError {
    MnemoError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}
