// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Entity model: memories, tasks, and the enums they are built from.
//!
//! Records are constructed through validated constructors ([`Memory::new`],
//! [`Task::new`]) so malformed input is rejected at the boundary instead of
//! deep inside scoring or storage code.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::complexity::detect_complexity;
use crate::error::MnemoError;
use crate::sanitize::{sanitize_file_stem, sanitize_project};

/// Which entity family an id belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Memory,
    Task,
}

/// Memory category.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Code,
    Work,
    Research,
    Conversations,
    Personal,
    #[default]
    General,
}

impl Category {
    pub const ALL: [Category; 6] = [
        Category::Code,
        Category::Work,
        Category::Research,
        Category::Conversations,
        Category::Personal,
        Category::General,
    ];
}

/// Priority shared by memories and tasks.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

/// Lifecycle status of a memory.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum MemoryStatus {
    #[default]
    Active,
    Archived,
}

/// Position of a task in the four-level hierarchy.
///
/// The derived ordering is the depth ordering: `Master < Epic < Task < Subtask`.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum TaskLevel {
    Master,
    Epic,
    Task,
    Subtask,
}

impl TaskLevel {
    /// Fixed maximum depth of the task tree.
    pub const MAX_DEPTH: usize = 4;

    /// 1-based depth (`Master` = 1).
    pub fn depth(self) -> usize {
        match self {
            TaskLevel::Master => 1,
            TaskLevel::Epic => 2,
            TaskLevel::Task => 3,
            TaskLevel::Subtask => 4,
        }
    }

    pub fn from_depth(depth: usize) -> Option<Self> {
        match depth {
            1 => Some(TaskLevel::Master),
            2 => Some(TaskLevel::Epic),
            3 => Some(TaskLevel::Task),
            4 => Some(TaskLevel::Subtask),
            _ => None,
        }
    }

    /// The level a parent of this level must have. `None` for `Master`.
    pub fn parent_level(self) -> Option<Self> {
        Self::from_depth(self.depth() - 1)
    }

    /// The level children of this level have. `None` for `Subtask`.
    pub fn child_level(self) -> Option<Self> {
        Self::from_depth(self.depth() + 1)
    }
}

/// Task status.
///
/// `completed` is accepted as an alias of `done` when parsing.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Todo,
    InProgress,
    #[serde(alias = "completed")]
    #[strum(to_string = "done", serialize = "completed")]
    Done,
    Blocked,
    Archived,
}

impl TaskStatus {
    /// Whether an explicit status change from `self` to `next` is allowed.
    ///
    /// `todo -> in_progress -> done`; `blocked` from `todo` or `in_progress`
    /// and back to `in_progress`; `archived` from anything and terminal.
    /// Setting the current status again is a no-op and always allowed.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        use TaskStatus::*;
        if self == next {
            return true;
        }
        match (self, next) {
            (Archived, _) => false,
            (_, Archived) => true,
            (Todo, InProgress) | (InProgress, Done) => true,
            (Todo | InProgress, Blocked) => true,
            (Blocked, InProgress) => true,
            _ => false,
        }
    }
}

/// Why a task and a memory were linked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionType {
    /// Linked manually by a prior action. Survives batch recomputation.
    Explicit,
    /// Metadata (project, category, tags) dominated the score.
    TagBased,
    /// Text similarity dominated the score.
    Semantic,
}

/// One entry of a task's `memory_connections`.
///
/// The referenced memory may no longer exist; dangling entries are pruned lazily.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryConnection {
    pub memory_id: String,
    pub connection_type: ConnectionType,
    pub strength: f64,
}

/// A free-form memory record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: String,
    pub content: String,
    /// Lowercased, sorted, de-duplicated.
    pub tags: Vec<String>,
    pub category: Category,
    /// Sanitized project identifier, safe as a directory name.
    pub project: String,
    pub priority: Priority,
    pub status: MemoryStatus,
    /// Complexity tier, 1 (trivial) to 4 (complex).
    pub complexity: u8,
    /// Weak references to other memories, strongest first.
    pub related_memory_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub accessed_at: DateTime<Utc>,
}

/// Input for creating a memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewMemory {
    /// Caller-chosen id. Generated when absent.
    #[serde(default)]
    pub id: Option<String>,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub complexity: Option<u8>,
}

impl NewMemory {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Self::default()
        }
    }
}

impl Memory {
    /// Builds a memory from validated input.
    ///
    /// Rejects empty content and out-of-range complexity tiers. The project is
    /// sanitized before anything else looks at it.
    pub fn new(input: NewMemory, now: DateTime<Utc>) -> Result<Self, MnemoError> {
        let content = input.content.trim().to_string();
        if content.is_empty() {
            return Err(MnemoError::Validation(
                "memory content must not be empty".to_string(),
            ));
        }
        let complexity = match input.complexity {
            Some(tier) if (1..=4).contains(&tier) => tier,
            Some(tier) => {
                return Err(MnemoError::Validation(format!(
                    "memory complexity must be between 1 and 4, got {tier}"
                )));
            }
            None => detect_complexity(&content),
        };
        let id = match input.id {
            Some(id) if !id.trim().is_empty() => {
                let id = id.trim().to_string();
                // The id is the file stem and must map to it unchanged.
                if sanitize_file_stem(&id) != id {
                    return Err(MnemoError::Validation(format!(
                        "memory id `{id}` is not usable as a file name"
                    )));
                }
                id
            }
            _ => uuid::Uuid::new_v4().to_string(),
        };

        Ok(Self {
            id,
            content,
            tags: normalize_tags(input.tags),
            category: input.category.unwrap_or_default(),
            project: sanitize_project(input.project.as_deref().unwrap_or_default()),
            priority: input.priority.unwrap_or_default(),
            status: MemoryStatus::Active,
            complexity,
            related_memory_ids: Vec::new(),
            created_at: now,
            updated_at: now,
            accessed_at: now,
        })
    }

    /// First line of the content, used where a memory needs a title.
    pub fn headline(&self) -> &str {
        self.content.lines().next().unwrap_or_default()
    }
}

/// Input for creating a task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewTask {
    #[serde(default)]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub level: TaskLevel,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub project: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewTask {
    pub fn new(title: impl Into<String>, level: TaskLevel) -> Self {
        Self {
            id: None,
            title: title.into(),
            description: String::new(),
            level,
            parent_id: None,
            status: None,
            priority: None,
            project: None,
            tags: Vec::new(),
        }
    }

    pub fn under(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn in_project(mut self, project: impl Into<String>) -> Self {
        self.project = Some(project.into());
        self
    }

    /// Field-level checks that need no storage access.
    pub fn validate(&self) -> Result<(), MnemoError> {
        if self.title.trim().is_empty() {
            return Err(MnemoError::Validation(
                "task title must not be empty".to_string(),
            ));
        }
        match (self.level, self.parent_id.as_deref()) {
            (TaskLevel::Master, Some(parent)) => Err(MnemoError::InvalidHierarchy(format!(
                "a master task cannot have a parent (got parent {parent})"
            ))),
            (level, None) if level != TaskLevel::Master => Err(MnemoError::InvalidHierarchy(
                format!("a {level} task requires a parent"),
            )),
            _ => Ok(()),
        }
    }
}

/// Where a task sits in the tree, computed by the path manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub path: String,
    pub path_order: u32,
    pub slug: String,
}

/// A hierarchical task record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: String,
    pub level: TaskLevel,
    pub parent_id: Option<String>,
    /// Materialized path, e.g. `001-proj-1a2b3c4d.002-design-5e6f7a8b`.
    pub path: String,
    /// Position among same-parent siblings. Never reused.
    pub path_order: u32,
    /// Filesystem slug fixed at creation; renaming the title does not move files.
    pub slug: String,
    /// Highest `path_order` ever handed to a child of this task.
    pub child_sequence: u32,
    pub status: TaskStatus,
    pub priority: Priority,
    pub project: String,
    pub tags: Vec<String>,
    pub memory_connections: Vec<MemoryConnection>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Builds a task from validated input and a computed placement.
    pub fn new(
        id: String,
        input: NewTask,
        placement: Placement,
        now: DateTime<Utc>,
    ) -> Result<Self, MnemoError> {
        input.validate()?;
        Ok(Self {
            id,
            title: input.title.trim().to_string(),
            description: input.description,
            level: input.level,
            parent_id: input.parent_id,
            path: placement.path,
            path_order: placement.path_order,
            slug: placement.slug,
            child_sequence: 0,
            status: input.status.unwrap_or_default(),
            priority: input.priority.unwrap_or_default(),
            project: sanitize_project(input.project.as_deref().unwrap_or_default()),
            tags: normalize_tags(input.tags),
            memory_connections: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }

    pub fn has_explicit_link(&self, memory_id: &str) -> bool {
        self.memory_connections
            .iter()
            .any(|c| c.memory_id == memory_id && c.connection_type == ConnectionType::Explicit)
    }
}

/// Lowercases, trims, sorts and de-duplicates tags, dropping empty ones.
pub fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut tags: Vec<String> = tags
        .into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .collect();
    tags.sort();
    tags.dedup();
    tags
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2026-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn memory_rejects_blank_content() {
        let err = Memory::new(NewMemory::new("   \n"), now()).unwrap_err();
        assert!(matches!(err, MnemoError::Validation(_)));
    }

    #[test]
    fn memory_rejects_out_of_range_complexity() {
        let mut input = NewMemory::new("content");
        input.complexity = Some(7);
        assert!(Memory::new(input, now()).is_err());
    }

    #[test]
    fn memory_rejects_ids_that_change_as_file_names() {
        for id in ["a/b", "../etc", "x".repeat(80).as_str(), "con"] {
            let mut input = NewMemory::new("content");
            input.id = Some(id.to_string());
            let err = Memory::new(input, now()).unwrap_err();
            assert!(matches!(err, MnemoError::Validation(_)), "{id} accepted");
        }

        let mut input = NewMemory::new("content");
        input.id = Some(" note_2026-01.v2 ".into());
        assert_eq!(Memory::new(input, now()).unwrap().id, "note_2026-01.v2");
    }

    #[test]
    fn memory_normalizes_tags_and_project() {
        let mut input = NewMemory::new("Fix the login flow");
        input.tags = vec!["Auth".into(), "auth".into(), " ".into(), "api".into()];
        input.project = Some("../My Project".into());
        let memory = Memory::new(input, now()).unwrap();
        assert_eq!(memory.tags, vec!["api", "auth"]);
        assert!(!memory.project.contains(".."));
        assert!(!memory.project.contains('/'));
        assert_eq!(memory.status, MemoryStatus::Active);
        assert!(!memory.id.is_empty());
    }

    #[test]
    fn task_level_ordering_and_neighbours() {
        assert!(TaskLevel::Master < TaskLevel::Epic);
        assert!(TaskLevel::Task < TaskLevel::Subtask);
        assert_eq!(TaskLevel::Master.parent_level(), None);
        assert_eq!(TaskLevel::Epic.parent_level(), Some(TaskLevel::Master));
        assert_eq!(TaskLevel::Subtask.child_level(), None);
        assert_eq!(TaskLevel::from_depth(3), Some(TaskLevel::Task));
        assert_eq!(TaskLevel::from_depth(5), None);
    }

    #[test]
    fn completed_is_an_alias_of_done() {
        assert_eq!(TaskStatus::from_str("completed").unwrap(), TaskStatus::Done);
        assert_eq!(TaskStatus::from_str("done").unwrap(), TaskStatus::Done);
        assert_eq!(TaskStatus::Done.to_string(), "done");
        assert_eq!(TaskStatus::InProgress.to_string(), "in_progress");
        let parsed: TaskStatus = serde_json::from_str("\"completed\"").unwrap();
        assert_eq!(parsed, TaskStatus::Done);
    }

    #[test]
    fn status_state_machine() {
        use TaskStatus::*;
        assert!(Todo.can_transition_to(InProgress));
        assert!(InProgress.can_transition_to(Done));
        assert!(Todo.can_transition_to(Blocked));
        assert!(InProgress.can_transition_to(Blocked));
        assert!(Blocked.can_transition_to(InProgress));
        assert!(Done.can_transition_to(Archived));
        assert!(Blocked.can_transition_to(Archived));

        assert!(!Todo.can_transition_to(Done));
        assert!(!Blocked.can_transition_to(Done));
        assert!(!Done.can_transition_to(Blocked));
        assert!(!Archived.can_transition_to(Todo));
        assert!(Archived.can_transition_to(Archived));
    }

    #[test]
    fn connection_type_uses_kebab_case() {
        assert_eq!(ConnectionType::TagBased.to_string(), "tag-based");
        let json = serde_json::to_string(&ConnectionType::TagBased).unwrap();
        assert_eq!(json, "\"tag-based\"");
    }

    #[test]
    fn new_task_validation() {
        assert!(NewTask::new("Proj", TaskLevel::Master).validate().is_ok());
        assert!(NewTask::new("", TaskLevel::Master).validate().is_err());
        let orphan_epic = NewTask::new("Design", TaskLevel::Epic);
        assert!(matches!(
            orphan_epic.validate(),
            Err(MnemoError::InvalidHierarchy(_))
        ));
        let parented_master = NewTask::new("Proj", TaskLevel::Master).under("x");
        assert!(matches!(
            parented_master.validate(),
            Err(MnemoError::InvalidHierarchy(_))
        ));
    }
}
