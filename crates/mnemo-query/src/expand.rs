// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query expansion.
//!
//! Turns free text into a set of lowercase search terms: the tokens
//! themselves plus typo and fuzzy corrections, synonyms, acronyms in both
//! directions, casing/separator variants and contextual phrases.

use std::collections::BTreeSet;
use std::sync::Arc;

use mnemo_config::QueryConfig;
use tracing::trace;

use crate::lexicon::Lexicon;
use crate::similarity::similarity;

/// Default minimum similarity for a fuzzy correction.
pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

/// Tokens shorter than this are never fuzzily corrected.
const FUZZY_MIN_LEN: usize = 5;

/// Tokens shorter than this are dropped unless the lexicon lists them.
const MIN_TOKEN_LEN: usize = 3;

/// Expands queries against a shared [`Lexicon`].
#[derive(Debug, Clone)]
pub struct QueryExpander {
    lexicon: Arc<Lexicon>,
    /// Fuzzy-correction targets, computed once from the lexicon.
    vocabulary: Arc<BTreeSet<String>>,
    fuzzy_threshold: f64,
}

impl Default for QueryExpander {
    fn default() -> Self {
        Self::new(Lexicon::builtin())
    }
}

impl QueryExpander {
    pub fn new(lexicon: Lexicon) -> Self {
        let vocabulary = lexicon.vocabulary().into_iter().map(str::to_string).collect();
        Self {
            lexicon: Arc::new(lexicon),
            vocabulary: Arc::new(vocabulary),
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }

    /// Built-in lexicon plus configured extras, with the configured fuzzy threshold.
    pub fn from_config(config: &QueryConfig) -> Self {
        Self::new(Lexicon::from_config(config)).with_fuzzy_threshold(config.fuzzy_threshold)
    }

    pub fn with_fuzzy_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Lowercase tokens of `text`, in order of first appearance.
    ///
    /// Splits on whitespace and punctuation but keeps `-` and `_` inside
    /// compound identifiers. Stopwords and tokens under three characters are
    /// dropped unless the lexicon lists them as short domain tokens.
    pub fn tokenize(&self, text: &str) -> Vec<String> {
        let mut seen = BTreeSet::new();
        raw_tokens(text)
            .map(str::to_lowercase)
            .filter(|t| self.is_meaningful(t))
            .filter(|t| seen.insert(t.clone()))
            .collect()
    }

    /// Expansion of a single term.
    pub fn expand_term(&self, term: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        let lower = term.trim().to_lowercase();
        if lower.is_empty() {
            return out;
        }
        out.insert(lower.clone());

        let words = split_words(term);
        if words.len() > 1 {
            out.extend(separator_variants(&words));
            out.extend(
                words
                    .iter()
                    .filter(|w| self.is_meaningful(w))
                    .cloned(),
            );
        }

        let mut bases = vec![lower.clone()];
        if let Some(corrected) = self.correct(&lower) {
            trace!(term = %lower, corrected = %corrected, "corrected query term");
            out.insert(corrected.clone());
            bases.push(corrected);
        }

        for base in &bases {
            out.extend(self.lexicon.synonyms(base).map(str::to_string));
            if let Some(expansion) = self.lexicon.acronym_expansion(base) {
                out.insert(expansion.to_string());
            }
            for (acronym, expansion) in self.lexicon.acronyms() {
                if expansion == base {
                    out.insert(acronym.to_string());
                }
            }
        }
        out
    }

    /// Full expansion of a query string.
    pub fn expand_query(&self, text: &str) -> BTreeSet<String> {
        let mut out = BTreeSet::new();

        let raw: Vec<&str> = raw_tokens(text).collect();
        for token in &raw {
            let lower = token.to_lowercase();
            if self.is_meaningful(&lower) || split_words(token).len() > 1 {
                out.extend(self.expand_term(token));
            }
        }

        // Space-separated words also match their joined forms.
        for pair in raw.windows(2) {
            let words = [pair[0].to_lowercase(), pair[1].to_lowercase()];
            out.extend(separator_variants(&words));
        }

        let normalized = normalize(text);
        for (phrase, terms) in self.lexicon.phrases() {
            if contains_phrase(&normalized, phrase) {
                out.insert(phrase.to_string());
                out.extend(terms.iter().cloned());
            }
        }
        for (acronym, expansion) in self.lexicon.acronyms() {
            if expansion.contains(' ') && contains_phrase(&normalized, expansion) {
                out.insert(acronym.to_string());
            }
        }
        out
    }

    fn is_meaningful(&self, token: &str) -> bool {
        if token.is_empty() || self.lexicon.is_stopword(token) {
            return false;
        }
        token.chars().count() >= MIN_TOKEN_LEN
            || self.lexicon.is_short_token(token)
            || token.chars().all(|c| c.is_ascii_digit())
    }

    /// Typo table first, then the closest lexicon word above the fuzzy threshold.
    fn correct(&self, lower: &str) -> Option<String> {
        if let Some(fixed) = self.lexicon.typo_correction(lower) {
            return Some(fixed.to_string());
        }
        if lower.chars().count() < FUZZY_MIN_LEN {
            return None;
        }
        if self.vocabulary.contains(lower) {
            return None;
        }
        self.vocabulary
            .iter()
            .map(|word| (similarity(lower, word), word))
            .filter(|(score, _)| *score >= self.fuzzy_threshold)
            .max_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, word)| word.to_string())
    }
}

/// Splits on whitespace and punctuation, keeping `-` and `_` inside tokens.
fn raw_tokens(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '_' || c == '\''))
        .map(|t| t.trim_matches(|c| c == '-' || c == '_' || c == '\''))
        .filter(|t| !t.is_empty())
}

/// Words of a compound identifier: `getUserName`, `get-user-name` and
/// `get_user_name` all give `["get", "user", "name"]`.
pub(crate) fn split_words(token: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for c in token.chars() {
        if c == '-' || c == '_' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if c.is_uppercase() && prev_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        prev_lower = c.is_lowercase() || c.is_ascii_digit();
        current.extend(c.to_lowercase());
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// kebab, snake, spaced, joined and camelCase forms of a word list.
fn separator_variants(words: &[String]) -> Vec<String> {
    let camel: String = words
        .iter()
        .enumerate()
        .map(|(i, w)| if i == 0 { w.clone() } else { capitalize(w) })
        .collect();
    vec![
        words.join("-"),
        words.join("_"),
        words.join(" "),
        words.concat(),
        camel,
    ]
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase text with every run of non-word characters collapsed to one space.
pub(crate) fn normalize(text: &str) -> String {
    let lower = text.to_lowercase();
    lower
        .split(|c: char| !(c.is_alphanumeric() || c == '\''))
        .filter(|w| !w.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Word-boundary phrase match on normalized text.
fn contains_phrase(normalized: &str, phrase: &str) -> bool {
    let padded = format!(" {normalized} ");
    padded.contains(&format!(" {phrase} "))
}
