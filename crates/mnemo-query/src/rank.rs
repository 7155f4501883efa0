// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Result ranking.
//!
//! Scores are additive bonuses:
//!
//! | signal | title | body |
//! |---|---|---|
//! | exact query substring | +10 | +5 |
//! | each expanded term | +3 | +1 |
//!
//! plus +2 for items updated within 7 days (+1 within 30) and a priority
//! bonus. Sorting is stable, so equal scores keep their input order.

use std::collections::BTreeSet;

use chrono::{DateTime, Duration, Utc};
use mnemo_core::{Memory, Priority, Task};

use crate::expand::normalize;

const EXACT_TITLE_BONUS: f64 = 10.0;
const EXACT_BODY_BONUS: f64 = 5.0;
const TERM_TITLE_BONUS: f64 = 3.0;
const TERM_BODY_BONUS: f64 = 1.0;
const RECENT_WEEK_BONUS: f64 = 2.0;
const RECENT_MONTH_BONUS: f64 = 1.0;

/// Anything the ranker can score.
pub trait Rankable {
    fn rank_title(&self) -> &str;
    fn rank_body(&self) -> &str;
    fn rank_updated_at(&self) -> DateTime<Utc>;
    fn rank_priority(&self) -> Priority;
}

impl Rankable for Memory {
    fn rank_title(&self) -> &str {
        self.headline()
    }

    fn rank_body(&self) -> &str {
        &self.content
    }

    fn rank_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn rank_priority(&self) -> Priority {
        self.priority
    }
}

impl Rankable for Task {
    fn rank_title(&self) -> &str {
        &self.title
    }

    fn rank_body(&self) -> &str {
        &self.description
    }

    fn rank_updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    fn rank_priority(&self) -> Priority {
        self.priority
    }
}

/// A scored result.
#[derive(Debug, Clone)]
pub struct Ranked<T> {
    pub item: T,
    pub score: f64,
    /// Whether the query text or any expanded term occurs in the item.
    pub matched: bool,
}

/// Scores and sorts `results`, highest first.
pub fn rank_results<T: Rankable>(
    results: Vec<T>,
    original_query: &str,
    expanded_terms: &BTreeSet<String>,
    now: DateTime<Utc>,
) -> Vec<Ranked<T>> {
    let query = normalize(original_query);
    let terms: Vec<String> = expanded_terms.iter().map(|t| normalize(t)).collect();

    let mut ranked: Vec<Ranked<T>> = results
        .into_iter()
        .map(|item| {
            let (text_score, matched) = text_score(&item, &query, &terms);
            let score = text_score
                + recency_bonus(item.rank_updated_at(), now)
                + priority_bonus(item.rank_priority());
            Ranked {
                item,
                score,
                matched,
            }
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}

fn text_score<T: Rankable>(item: &T, query: &str, terms: &[String]) -> (f64, bool) {
    let title = Field::new(item.rank_title());
    let body = Field::new(item.rank_body());
    let mut score = 0.0;
    let mut matched = false;

    if !query.is_empty() {
        if title.contains(query) {
            score += EXACT_TITLE_BONUS;
            matched = true;
        }
        if body.contains(query) {
            score += EXACT_BODY_BONUS;
            matched = true;
        }
    }

    for term in terms.iter().filter(|t| !t.is_empty()) {
        if title.contains(term) {
            score += TERM_TITLE_BONUS;
            matched = true;
        }
        if body.contains(term) {
            score += TERM_BODY_BONUS;
            matched = true;
        }
    }
    (score, matched)
}

fn recency_bonus(updated_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    let age = now - updated_at;
    if age <= Duration::days(7) {
        RECENT_WEEK_BONUS
    } else if age <= Duration::days(30) {
        RECENT_MONTH_BONUS
    } else {
        0.0
    }
}

fn priority_bonus(priority: Priority) -> f64 {
    match priority {
        Priority::Low => 0.0,
        Priority::Medium => 0.5,
        Priority::High => 1.0,
        Priority::Urgent => 2.0,
    }
}

/// Normalized text padded with spaces, so matches land on word boundaries.
struct Field(String);

impl Field {
    fn new(text: &str) -> Self {
        Self(format!(" {} ", normalize(text)))
    }

    fn contains(&self, normalized_term: &str) -> bool {
        self.0.contains(&format!(" {normalized_term} "))
    }
}
