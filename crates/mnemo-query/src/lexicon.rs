// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vocabulary tables used by query expansion.
//!
//! A [`Lexicon`] is assembled once (built-in tables plus configured extras)
//! and then shared read-only by the expander and the linking engine.

use std::collections::{BTreeMap, BTreeSet};

use mnemo_config::QueryConfig;

/// Built-in synonym groups. Every pair inside a group is linked both ways.
const SYNONYM_GROUPS: &[(&str, &[&str])] = &[
    ("bug", &["issue", "defect", "error"]),
    ("fix", &["patch", "resolve", "repair"]),
    ("error", &["failure", "exception", "fault"]),
    ("crash", &["panic", "failure"]),
    ("database", &["datastore", "storage"]),
    ("deploy", &["release", "ship", "rollout"]),
    ("test", &["verify", "check", "validate"]),
    ("auth", &["authentication", "login", "signin"]),
    ("config", &["configuration", "settings", "setup"]),
    ("perf", &["performance", "optimization", "latency"]),
    ("docs", &["documentation", "readme", "guide"]),
    ("frontend", &["interface", "client"]),
    ("backend", &["server", "service"]),
    ("disconnect", &["disconnected", "disconnection", "dropped"]),
    ("connection", &["connect", "connectivity", "link"]),
    ("task", &["todo", "ticket", "chore"]),
    ("memory", &["note", "knowledge", "context"]),
    ("refactor", &["restructure", "cleanup", "rewrite"]),
    ("slow", &["sluggish", "latency", "performance"]),
    ("search", &["query", "lookup", "find"]),
];

/// Built-in acronyms and their expansions.
const ACRONYMS: &[(&str, &str)] = &[
    ("mcp", "model context protocol"),
    ("api", "application programming interface"),
    ("ui", "user interface"),
    ("ux", "user experience"),
    ("db", "database"),
    ("ci", "continuous integration"),
    ("cd", "continuous deployment"),
    ("pr", "pull request"),
    ("llm", "large language model"),
    ("ai", "artificial intelligence"),
    ("ml", "machine learning"),
    ("js", "javascript"),
    ("ts", "typescript"),
    ("k8s", "kubernetes"),
    ("jwt", "json web token"),
    ("sql", "structured query language"),
    ("cli", "command line interface"),
    ("http", "hypertext transfer protocol"),
    ("oom", "out of memory"),
];

/// Common misspellings and their corrections.
const TYPOS: &[(&str, &str)] = &[
    ("disconneted", "disconnected"),
    ("conection", "connection"),
    ("connnection", "connection"),
    ("recieve", "receive"),
    ("seperate", "separate"),
    ("databse", "database"),
    ("authentification", "authentication"),
    ("dependancy", "dependency"),
    ("occured", "occurred"),
    ("enviroment", "environment"),
    ("memroy", "memory"),
    ("funtion", "function"),
    ("retreive", "retrieve"),
    ("perfomance", "performance"),
];

/// Multi-word phrases that imply extra search terms.
const PHRASES: &[(&str, &[&str])] = &[
    ("not working", &["broken", "failing", "error", "bug"]),
    ("does not work", &["broken", "failing", "error", "bug"]),
    ("doesn't work", &["broken", "failing", "error", "bug"]),
    ("too slow", &["performance", "latency"]),
    ("set up", &["setup", "install", "configure"]),
    ("log in", &["login", "authentication"]),
    ("how to", &["guide", "tutorial"]),
    ("memory leak", &["leak", "oom"]),
];

/// Tokens shorter than three characters that still carry meaning.
const SHORT_TOKENS: &[&str] = &[
    "ui", "ux", "db", "pr", "ci", "cd", "js", "ts", "ai", "ml", "id", "io", "os", "qa", "vm",
];

const STOPWORDS: &[&str] = &[
    "the", "and", "for", "with", "that", "this", "from", "are", "was", "were", "has", "have",
    "into", "onto", "about", "but", "not", "you", "your", "our", "its",
];

/// Immutable expansion tables.
#[derive(Debug, Clone)]
pub struct Lexicon {
    synonyms: BTreeMap<String, BTreeSet<String>>,
    acronyms: BTreeMap<String, String>,
    typos: BTreeMap<String, String>,
    phrases: BTreeMap<String, Vec<String>>,
    short_tokens: BTreeSet<String>,
    stopwords: BTreeSet<String>,
}

impl Default for Lexicon {
    /// The built-in tables.
    fn default() -> Self {
        Self::builtin()
    }
}

impl Lexicon {
    /// A lexicon with no tables at all.
    pub fn empty() -> Self {
        Self {
            synonyms: BTreeMap::new(),
            acronyms: BTreeMap::new(),
            typos: BTreeMap::new(),
            phrases: BTreeMap::new(),
            short_tokens: BTreeSet::new(),
            stopwords: BTreeSet::new(),
        }
    }

    /// The built-in tables.
    pub fn builtin() -> Self {
        let mut lexicon = Self::empty();
        for (term, group) in SYNONYM_GROUPS {
            lexicon.add_synonyms(term, group.iter().copied());
        }
        for (acronym, expansion) in ACRONYMS {
            lexicon.add_acronym(acronym, expansion);
        }
        for (typo, correction) in TYPOS {
            lexicon
                .typos
                .insert((*typo).to_string(), (*correction).to_string());
        }
        for (phrase, terms) in PHRASES {
            lexicon.phrases.insert(
                (*phrase).to_string(),
                terms.iter().map(|t| (*t).to_string()).collect(),
            );
        }
        lexicon.short_tokens = SHORT_TOKENS.iter().map(|t| (*t).to_string()).collect();
        lexicon.stopwords = STOPWORDS.iter().map(|t| (*t).to_string()).collect();
        lexicon
    }

    /// Built-in tables extended with the configured synonyms and acronyms.
    pub fn from_config(config: &QueryConfig) -> Self {
        let mut lexicon = Self::builtin();
        for (term, synonyms) in &config.synonyms {
            lexicon.add_synonyms(term, synonyms.iter().map(String::as_str));
        }
        for (acronym, expansion) in &config.acronyms {
            lexicon.add_acronym(acronym, expansion);
        }
        lexicon
    }

    /// Links `term` with every entry of `group`, and the entries with each other.
    pub fn with_synonyms<'a>(mut self, term: &str, group: impl IntoIterator<Item = &'a str>) -> Self {
        self.add_synonyms(term, group);
        self
    }

    pub fn with_acronym(mut self, acronym: &str, expansion: &str) -> Self {
        self.add_acronym(acronym, expansion);
        self
    }

    pub fn with_typo(mut self, typo: &str, correction: &str) -> Self {
        self.typos
            .insert(typo.to_lowercase(), correction.to_lowercase());
        self
    }

    fn add_synonyms<'a>(&mut self, term: &str, group: impl IntoIterator<Item = &'a str>) {
        let mut members: BTreeSet<String> = group
            .into_iter()
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty())
            .collect();
        members.insert(term.trim().to_lowercase());
        for member in &members {
            let entry = self.synonyms.entry(member.clone()).or_default();
            entry.extend(members.iter().filter(|m| *m != member).cloned());
        }
    }

    fn add_acronym(&mut self, acronym: &str, expansion: &str) {
        let acronym = acronym.trim().to_lowercase();
        if acronym.len() < 3 {
            self.short_tokens.insert(acronym.clone());
        }
        self.acronyms
            .insert(acronym, expansion.trim().to_lowercase());
    }

    /// Synonyms of a lowercase term, excluding the term itself.
    pub fn synonyms(&self, term: &str) -> impl Iterator<Item = &str> {
        self.synonyms
            .get(term)
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    pub fn acronym_expansion(&self, acronym: &str) -> Option<&str> {
        self.acronyms.get(acronym).map(String::as_str)
    }

    /// Acronym and expansion pairs.
    pub fn acronyms(&self) -> impl Iterator<Item = (&str, &str)> {
        self.acronyms.iter().map(|(a, e)| (a.as_str(), e.as_str()))
    }

    pub fn typo_correction(&self, term: &str) -> Option<&str> {
        self.typos.get(term).map(String::as_str)
    }

    /// Phrases and the terms they imply.
    pub fn phrases(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.phrases.iter().map(|(p, t)| (p.as_str(), t.as_slice()))
    }

    pub fn is_short_token(&self, token: &str) -> bool {
        self.short_tokens.contains(token)
    }

    pub fn is_stopword(&self, token: &str) -> bool {
        self.stopwords.contains(token)
    }

    /// Every single word the lexicon knows, used as fuzzy-correction targets.
    pub fn vocabulary(&self) -> BTreeSet<&str> {
        let mut words: BTreeSet<&str> = BTreeSet::new();
        words.extend(self.synonyms.keys().map(String::as_str));
        words.extend(self.acronyms.keys().map(String::as_str));
        words.extend(
            self.acronyms
                .values()
                .flat_map(|e| e.split_whitespace()),
        );
        words.extend(self.typos.values().map(String::as_str));
        words.extend(
            self.phrases
                .values()
                .flat_map(|terms| terms.iter().map(String::as_str)),
        );
        words.retain(|w| !w.contains(' '));
        words
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synonyms_are_bidirectional() {
        let lexicon = Lexicon::builtin();
        assert!(lexicon.synonyms("bug").any(|s| s == "defect"));
        assert!(lexicon.synonyms("defect").any(|s| s == "bug"));
        assert!(lexicon.synonyms("defect").any(|s| s == "issue"));
        assert!(!lexicon.synonyms("bug").any(|s| s == "bug"));
    }

    #[test]
    fn config_extends_builtin_tables() {
        let mut config = QueryConfig::default();
        config
            .synonyms
            .insert("Ship".into(), vec!["launch".into()]);
        config.acronyms.insert("SLO".into(), "Service Level Objective".into());
        let lexicon = Lexicon::from_config(&config);
        assert!(lexicon.synonyms("launch").any(|s| s == "ship"));
        assert_eq!(lexicon.acronym_expansion("slo"), Some("service level objective"));
        assert_eq!(lexicon.acronym_expansion("mcp"), Some("model context protocol"));
    }

    #[test]
    fn short_acronyms_become_short_tokens() {
        let lexicon = Lexicon::empty().with_acronym("QA", "quality assurance");
        assert!(lexicon.is_short_token("qa"));
    }

    #[test]
    fn vocabulary_contains_single_words_only() {
        let lexicon = Lexicon::builtin();
        let vocab = lexicon.vocabulary();
        assert!(vocab.contains("configuration"));
        assert!(vocab.contains("protocol"));
        assert!(vocab.iter().all(|w| !w.contains(' ')));
    }
}
