// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of domain-specific tokens: identifiers, acronyms, versions.

use std::collections::BTreeSet;

use mnemo_query::Lexicon;

/// Lowercased technical tokens found in `text`.
///
/// A word counts when it looks like code (`snake_case`, `camelCase`,
/// `path::to`, `file.rs`), mixes letters and digits (`http2`, `v1`), is an
/// upper-case acronym (`API`, `JWT`) or is an acronym the lexicon knows.
pub fn technical_tokens(text: &str, lexicon: &Lexicon) -> BTreeSet<String> {
    text.split(|c: char| {
        c.is_whitespace()
            || matches!(
                c,
                ',' | ';' | '(' | ')' | '[' | ']' | '{' | '}' | '"' | '\'' | '`' | '!' | '?'
            )
    })
    .map(|w| w.trim_matches(|c: char| matches!(c, '.' | ':' | '-')))
    .filter(|w| is_technical(w, lexicon))
    .map(str::to_lowercase)
    .collect()
}

fn is_technical(word: &str, lexicon: &Lexicon) -> bool {
    if !word.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    let lower = word.to_lowercase();
    word.contains('_')
        || word.contains("::")
        || (word.contains('.') && word.len() >= 4)
        || word.chars().any(|c| c.is_ascii_digit())
        || is_camel_case(word)
        || is_acronym(word)
        || lexicon.acronym_expansion(&lower).is_some()
}

/// A lowercase letter immediately followed by an uppercase one.
fn is_camel_case(word: &str) -> bool {
    word.as_bytes()
        .windows(2)
        .any(|w| w[0].is_ascii_lowercase() && w[1].is_ascii_uppercase())
}

fn is_acronym(word: &str) -> bool {
    (2..=6).contains(&word.len())
        && word
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        && word.chars().filter(char::is_ascii_uppercase).count() >= 2
}
