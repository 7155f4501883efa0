// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for Mnemo.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Mnemo configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MnemoConfig {
    /// Where entity files live and how long paths may get.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Relevance linking thresholds, caps and factor weights.
    #[serde(default)]
    pub linking: LinkingConfig,

    /// Query expansion tuning and lexicon extensions.
    #[serde(default)]
    pub query: QueryConfig,

    /// Backup location and retention.
    #[serde(default)]
    pub durability: DurabilityConfig,

    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Storage root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding `tasks/`, `memories/` and `backups/`.
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    /// Longest file path (in bytes) a task file may have.
    #[serde(default = "default_max_path_length")]
    pub max_path_length: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            max_path_length: default_max_path_length(),
        }
    }
}

fn default_root_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("mnemo"))
        .unwrap_or_else(|| PathBuf::from(".mnemo"))
        .to_string_lossy()
        .into_owned()
}

fn default_max_path_length() -> usize {
    if cfg!(windows) { 260 } else { 4096 }
}

/// Relevance linking configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LinkingConfig {
    /// A connection is materialized only when the total score exceeds this.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f64,

    /// Maximum computed connections kept per task (explicit links are extra).
    #[serde(default = "default_max_connections")]
    pub max_connections: usize,

    /// Maximum `related_memory_ids` kept per memory.
    #[serde(default = "default_max_related_memories")]
    pub max_related_memories: usize,

    /// Run linking in the background after every create.
    #[serde(default = "default_link_on_create")]
    pub link_on_create: bool,

    /// Per-factor weights of the relevance score.
    #[serde(default)]
    pub weights: ScoreWeights,
}

impl Default for LinkingConfig {
    fn default() -> Self {
        Self {
            relevance_threshold: default_relevance_threshold(),
            max_connections: default_max_connections(),
            max_related_memories: default_max_related_memories(),
            link_on_create: default_link_on_create(),
            weights: ScoreWeights::default(),
        }
    }
}

fn default_relevance_threshold() -> f64 {
    0.3
}

fn default_max_connections() -> usize {
    10
}

fn default_max_related_memories() -> usize {
    5
}

fn default_link_on_create() -> bool {
    true
}

/// Weights of the six relevance factors.
///
/// These are additive bonuses, not a probability distribution; they do not
/// need to sum to 1.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ScoreWeights {
    #[serde(default = "default_semantic_weight")]
    pub semantic: f64,
    #[serde(default = "default_project_weight")]
    pub project: f64,
    #[serde(default = "default_category_weight")]
    pub category: f64,
    #[serde(default = "default_tags_weight")]
    pub tags: f64,
    #[serde(default = "default_keywords_weight")]
    pub keywords: f64,
    #[serde(default = "default_technical_weight")]
    pub technical: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            semantic: default_semantic_weight(),
            project: default_project_weight(),
            category: default_category_weight(),
            tags: default_tags_weight(),
            keywords: default_keywords_weight(),
            technical: default_technical_weight(),
        }
    }
}

impl ScoreWeights {
    pub(crate) fn named(&self) -> [(&'static str, f64); 6] {
        [
            ("semantic", self.semantic),
            ("project", self.project),
            ("category", self.category),
            ("tags", self.tags),
            ("keywords", self.keywords),
            ("technical", self.technical),
        ]
    }
}

fn default_semantic_weight() -> f64 {
    0.40
}

fn default_project_weight() -> f64 {
    0.25
}

fn default_category_weight() -> f64 {
    0.15
}

fn default_tags_weight() -> f64 {
    0.15
}

fn default_keywords_weight() -> f64 {
    0.10
}

fn default_technical_weight() -> f64 {
    0.08
}

/// Query intelligence configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct QueryConfig {
    /// Minimum normalized edit similarity for a fuzzy typo correction.
    #[serde(default = "default_fuzzy_threshold")]
    pub fuzzy_threshold: f64,

    /// Extra synonym groups merged into the built-in lexicon (term -> synonyms).
    #[serde(default)]
    pub synonyms: BTreeMap<String, Vec<String>>,

    /// Extra acronyms merged into the built-in lexicon (acronym -> expansion).
    #[serde(default)]
    pub acronyms: BTreeMap<String, String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: default_fuzzy_threshold(),
            synonyms: BTreeMap::new(),
            acronyms: BTreeMap::new(),
        }
    }
}

fn default_fuzzy_threshold() -> f64 {
    0.85
}

/// Backup configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DurabilityConfig {
    /// Backup directory. Defaults to `<root_dir>/backups`.
    #[serde(default)]
    pub backup_dir: Option<String>,

    /// Number of most recent backups kept by pruning.
    #[serde(default = "default_keep_backups")]
    pub keep_backups: usize,
}

impl Default for DurabilityConfig {
    fn default() -> Self {
        Self {
            backup_dir: None,
            keep_backups: default_keep_backups(),
        }
    }
}

fn default_keep_backups() -> usize {
    20
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl MnemoConfig {
    /// Storage root as a path.
    pub fn root_dir(&self) -> PathBuf {
        PathBuf::from(&self.storage.root_dir)
    }

    /// Resolved backup directory.
    pub fn backup_dir(&self) -> PathBuf {
        match &self.durability.backup_dir {
            Some(dir) => PathBuf::from(dir),
            None => self.root_dir().join("backups"),
        }
    }

    /// Default configuration rooted at `root`. Used by tests and embedders.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        let mut config = Self::default();
        config.storage.root_dir = root.into().to_string_lossy().into_owned();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_match_the_scoring_table() {
        let w = ScoreWeights::default();
        assert_eq!(w.semantic, 0.40);
        assert_eq!(w.project, 0.25);
        assert_eq!(w.category, 0.15);
        assert_eq!(w.tags, 0.15);
        assert_eq!(w.keywords, 0.10);
        assert_eq!(w.technical, 0.08);
    }

    #[test]
    fn backup_dir_defaults_under_root() {
        let config = MnemoConfig::with_root("/srv/mnemo");
        assert_eq!(config.backup_dir(), PathBuf::from("/srv/mnemo/backups"));
    }

    #[test]
    fn explicit_backup_dir_wins() {
        let mut config = MnemoConfig::with_root("/srv/mnemo");
        config.durability.backup_dir = Some("/mnt/backups".into());
        assert_eq!(config.backup_dir(), PathBuf::from("/mnt/backups"));
    }

    #[test]
    fn partial_weights_table_keeps_other_defaults() {
        let toml_str = r#"
[linking.weights]
semantic = 0.5
"#;
        let config: MnemoConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.linking.weights.semantic, 0.5);
        assert_eq!(config.linking.weights.project, 0.25);
    }
}
