// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Keyword-based category inference.
//!
//! Tasks carry no category of their own; the linker infers one from their
//! text so the category factor can compare it with a memory's category.

use mnemo_core::Category;

/// Indicator words per category, matched against lowercase tokens.
const INDICATORS: &[(Category, &[&str])] = &[
    (
        Category::Code,
        &[
            "code", "bug", "fix", "function", "api", "compile", "compiler", "refactor", "deploy",
            "build", "test", "tests", "error", "exception", "stack", "database", "sql", "git",
            "commit", "endpoint", "server", "crate", "library", "module", "rust", "python",
            "typescript", "javascript", "config", "cli", "script", "debug", "implement",
        ],
    ),
    (
        Category::Work,
        &[
            "meeting", "deadline", "client", "customer", "roadmap", "sprint", "milestone",
            "stakeholder", "report", "budget", "launch", "release", "plan", "planning",
            "team", "hire", "hiring", "okr", "quarter", "review",
        ],
    ),
    (
        Category::Research,
        &[
            "research", "paper", "study", "experiment", "analysis", "benchmark", "investigate",
            "compare", "comparison", "survey", "hypothesis", "evaluate", "literature", "findings",
        ],
    ),
    (
        Category::Conversations,
        &[
            "said", "discussed", "discussion", "call", "chat", "conversation", "talked", "asked",
            "email", "message", "replied", "mentioned", "feedback",
        ],
    ),
    (
        Category::Personal,
        &[
            "family", "birthday", "health", "personal", "vacation", "holiday", "gym", "doctor",
            "grocery", "groceries", "hobby", "friend", "home", "travel",
        ],
    ),
];

/// Category with the most indicator hits among `tokens`.
///
/// Ties go to the category listed first; no hits means [`Category::General`].
pub fn infer_category<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Category {
    let mut hits = [0usize; INDICATORS.len()];
    for token in tokens {
        for (i, (_, words)) in INDICATORS.iter().enumerate() {
            if words.contains(&token) {
                hits[i] += 1;
            }
        }
    }

    let mut best = Category::General;
    let mut best_hits = 0;
    for (i, (category, _)) in INDICATORS.iter().enumerate() {
        if hits[i] > best_hits {
            best = *category;
            best_hits = hits[i];
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_words_infer_code() {
        assert_eq!(infer_category(["fix", "login", "bug"]), Category::Code);
    }

    #[test]
    fn no_indicators_is_general() {
        assert_eq!(infer_category(["banana", "orange"]), Category::General);
        assert_eq!(infer_category([]), Category::General);
    }

    #[test]
    fn majority_wins() {
        assert_eq!(
            infer_category(["meeting", "client", "deadline", "api"]),
            Category::Work
        );
    }

    #[test]
    fn ties_prefer_the_earlier_category() {
        assert_eq!(infer_category(["paper", "bug"]), Category::Code);
    }
}
