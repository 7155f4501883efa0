// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Heuristic complexity tiers for memory content.
//!
//! Zero-cost signals only: length, code fences, structure and a short list of
//! indicator words. Tier 1 is a one-liner note, tier 4 a long technical write-up.

/// Words that usually mark analytical or technical content.
const COMPLEX_INDICATORS: &[&str] = &[
    "architecture",
    "algorithm",
    "trade-off",
    "tradeoff",
    "refactor",
    "implement",
    "design",
    "benchmark",
    "migration",
    "concurrency",
    "root cause",
    "step by step",
];

/// Classify content into a complexity tier between 1 and 4.
pub fn detect_complexity(content: &str) -> u8 {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return 1;
    }

    let lower = trimmed.to_lowercase();
    let mut score: i32 = 0;

    // Signal 1: length
    score += match trimmed.split_whitespace().count() {
        0..30 => 0,
        30..150 => 1,
        150..500 => 2,
        _ => 3,
    };

    // Signal 2: code fences
    if trimmed.contains("```") {
        score += 1;
    }

    // Signal 3: indicator words
    if COMPLEX_INDICATORS.iter().any(|w| lower.contains(w)) {
        score += 1;
    }

    // Signal 4: list structure
    let list_lines = trimmed
        .lines()
        .filter(|l| {
            let l = l.trim_start();
            l.starts_with("- ") || l.starts_with("* ") || l.starts_with("1.")
        })
        .count();
    if list_lines >= 3 {
        score += 1;
    }

    (1 + score).clamp(1, 4) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_note_is_tier_one() {
        assert_eq!(detect_complexity("Buy milk"), 1);
        assert_eq!(detect_complexity(""), 1);
    }

    #[test]
    fn indicator_words_raise_the_tier() {
        assert_eq!(detect_complexity("Refactor the cache"), 2);
    }

    #[test]
    fn long_technical_content_caps_at_four() {
        let body = "word ".repeat(600);
        let content = format!("Architecture notes\n```rust\nfn main() {{}}\n```\n{body}");
        assert_eq!(detect_complexity(&content), 4);
    }

    #[test]
    fn list_structure_counts() {
        let content = "Plan:\n- one\n- two\n- three";
        assert_eq!(detect_complexity(content), 2);
    }
}
