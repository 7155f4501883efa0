// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Multi-factor relevance scoring.
//!
//! A score is a weighted sum of six independent factors, each in `[0, 1]`:
//! semantic similarity, same project, category match, tag overlap, keyword
//! density and shared technical tokens. The total is not capped.

use std::collections::BTreeSet;
use std::sync::Arc;

use mnemo_config::LinkingConfig;
use mnemo_config::model::ScoreWeights;
use mnemo_core::{Category, ConnectionType, Memory, MnemoError, SemanticProvider, Task};
use mnemo_query::{QueryExpander, jaccard};
use serde::Serialize;
use tracing::{debug, warn};

use crate::category::infer_category;
use crate::technical::technical_tokens;

/// Weighted contribution of each factor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    pub semantic: f64,
    pub project: f64,
    pub category: f64,
    pub tags: f64,
    pub keywords: f64,
    pub technical: f64,
}

impl ScoreBreakdown {
    /// Semantic, keyword and technical contributions.
    pub fn textual(&self) -> f64 {
        self.semantic + self.keywords + self.technical
    }

    /// Project, category and tag contributions.
    pub fn metadata(&self) -> f64 {
        self.project + self.category + self.tags
    }

    pub fn total(&self) -> f64 {
        self.semantic + self.project + self.category + self.tags + self.keywords + self.technical
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RelevanceScore {
    pub total: f64,
    pub breakdown: ScoreBreakdown,
    /// The semantic factor came from lexical overlap instead of the provider.
    pub degraded: bool,
}

/// The parts of a task or memory the scorer looks at.
#[derive(Debug, Clone)]
pub struct Profile<'a> {
    /// Full text for semantic comparison.
    pub text: String,
    /// Short text whose tokens drive keyword density.
    pub headline: &'a str,
    pub project: &'a str,
    pub category: Option<Category>,
    pub tags: &'a [String],
}

impl<'a> Profile<'a> {
    /// Task profile. The category is inferred later from the text.
    pub fn of_task(task: &'a Task) -> Self {
        let text = if task.description.trim().is_empty() {
            task.title.clone()
        } else {
            format!("{}\n{}", task.title, task.description)
        };
        Self {
            text,
            headline: &task.title,
            project: &task.project,
            category: None,
            tags: &task.tags,
        }
    }

    pub fn of_memory(memory: &'a Memory) -> Self {
        Self {
            text: memory.content.clone(),
            headline: memory.headline(),
            project: &memory.project,
            category: Some(memory.category),
            tags: &memory.tags,
        }
    }
}

/// Scores task-memory and memory-memory pairs.
pub struct RelevanceEngine {
    expander: Arc<QueryExpander>,
    provider: Option<Arc<dyn SemanticProvider>>,
    weights: ScoreWeights,
    threshold: f64,
}

impl RelevanceEngine {
    pub fn new(expander: Arc<QueryExpander>, config: &LinkingConfig) -> Self {
        Self {
            expander,
            provider: None,
            weights: config.weights,
            threshold: config.relevance_threshold,
        }
    }

    /// Uses `provider` for the semantic factor instead of lexical overlap.
    pub fn with_provider(mut self, provider: Arc<dyn SemanticProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn expander(&self) -> &QueryExpander {
        &self.expander
    }

    /// Whether `score` is strong enough to become a connection.
    pub fn is_relevant(&self, score: &RelevanceScore) -> bool {
        score.total > self.threshold
    }

    pub async fn score(&self, task: &Task, memory: &Memory) -> RelevanceScore {
        self.score_profiles(&Profile::of_task(task), &Profile::of_memory(memory))
            .await
    }

    /// Relevance of memory `b` to memory `a`, used for `related_memory_ids`.
    pub async fn score_memories(&self, a: &Memory, b: &Memory) -> RelevanceScore {
        self.score_profiles(&Profile::of_memory(a), &Profile::of_memory(b))
            .await
    }

    pub async fn score_profiles(&self, source: &Profile<'_>, target: &Profile<'_>) -> RelevanceScore {
        let (semantic, degraded) = self.semantic(&source.text, &target.text).await;

        let project = if source.project == target.project { 1.0 } else { 0.0 };

        let source_category = source
            .category
            .unwrap_or_else(|| self.infer_category(source));
        let target_category = target
            .category
            .unwrap_or_else(|| self.infer_category(target));
        let category = if source_category == target_category { 1.0 } else { 0.0 };

        let tags = jaccard(&self.expand_tags(source.tags), &self.expand_tags(target.tags));
        let keywords = self.keyword_density(source.headline, &target.text);

        let lexicon = self.expander.lexicon();
        let shared_technical = technical_tokens(&source.text, lexicon)
            .intersection(&technical_tokens(&target.text, lexicon))
            .next()
            .is_some();
        let technical = if shared_technical { 1.0 } else { 0.0 };

        let w = &self.weights;
        let breakdown = ScoreBreakdown {
            semantic: w.semantic * semantic,
            project: w.project * project,
            category: w.category * category,
            tags: w.tags * tags,
            keywords: w.keywords * keywords,
            technical: w.technical * technical,
        };
        RelevanceScore {
            total: breakdown.total(),
            breakdown,
            degraded,
        }
    }

    /// Connection type for a scored pair.
    ///
    /// An existing manual link stays `explicit`. Otherwise the larger of the
    /// textual and metadata groups decides; ties go to `tag-based`.
    pub fn classify(&self, score: &RelevanceScore, explicit: bool) -> ConnectionType {
        classify(score, explicit)
    }

    /// Provider similarity, or token Jaccard when the provider is absent or fails.
    async fn semantic(&self, a: &str, b: &str) -> (f64, bool) {
        let Some(provider) = &self.provider else {
            return (self.lexical_overlap(a, b), false);
        };
        match provider.similarity(a, b).await {
            Ok(value) if value.is_finite() => (value.clamp(0.0, 1.0), false),
            Ok(value) => {
                let err = MnemoError::DegradedScoring(format!(
                    "{} returned a non-finite similarity ({value})",
                    provider.name()
                ));
                warn!(provider = provider.name(), error = %err, "falling back to lexical overlap");
                (self.lexical_overlap(a, b), true)
            }
            Err(source) => {
                let err = MnemoError::DegradedScoring(format!("{}: {source}", provider.name()));
                warn!(provider = provider.name(), error = %err, "falling back to lexical overlap");
                (self.lexical_overlap(a, b), true)
            }
        }
    }

    fn lexical_overlap(&self, a: &str, b: &str) -> f64 {
        let a: BTreeSet<String> = self.expander.tokenize(a).into_iter().collect();
        let b: BTreeSet<String> = self.expander.tokenize(b).into_iter().collect();
        jaccard(&a, &b)
    }

    fn infer_category(&self, profile: &Profile<'_>) -> Category {
        let mut tokens = self.expander.tokenize(&profile.text);
        tokens.extend(profile.tags.iter().cloned());
        infer_category(tokens.iter().map(String::as_str))
    }

    /// Tags plus their lexicon synonyms.
    fn expand_tags(&self, tags: &[String]) -> BTreeSet<String> {
        let lexicon = self.expander.lexicon();
        let mut out = BTreeSet::new();
        for tag in tags {
            let tag = tag.to_lowercase();
            out.extend(lexicon.synonyms(&tag).map(str::to_string));
            out.insert(tag);
        }
        out
    }

    /// Fraction of headline tokens that, in some expanded form, occur in `text`.
    fn keyword_density(&self, headline: &str, text: &str) -> f64 {
        let terms = self.expander.tokenize(headline);
        if terms.is_empty() {
            return 0.0;
        }
        let haystack = format!(" {} ", word_string(text));
        let found = terms
            .iter()
            .filter(|term| {
                self.expander
                    .expand_term(term)
                    .iter()
                    .any(|form| haystack.contains(&format!(" {} ", word_string(form))))
            })
            .count();
        let density = found as f64 / terms.len() as f64;
        debug!(found, total = terms.len(), density, "keyword density");
        density
    }
}

/// Free-function form of [`RelevanceEngine::classify`].
pub fn classify(score: &RelevanceScore, explicit: bool) -> ConnectionType {
    if explicit {
        ConnectionType::Explicit
    } else if score.breakdown.textual() > score.breakdown.metadata() {
        ConnectionType::Semantic
    } else {
        ConnectionType::TagBased
    }
}

/// Lowercase words separated by single spaces, for whole-word matching.
fn word_string(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric() && c != '_' && c != '-')
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}
