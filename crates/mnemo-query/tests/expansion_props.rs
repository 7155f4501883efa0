// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property tests for query expansion and similarity.

use mnemo_query::{QueryExpander, similarity};
use proptest::prelude::*;

proptest! {
    #[test]
    fn similarity_is_symmetric_and_bounded(a in "[a-z]{0,12}", b in "[a-z]{0,12}") {
        let ab = similarity(&a, &b);
        let ba = similarity(&b, &a);
        prop_assert!((0.0..=1.0).contains(&ab));
        prop_assert!((ab - ba).abs() < 1e-12);
    }

    #[test]
    fn expansion_contains_every_token(words in prop::collection::vec("[a-z]{3,10}", 1..6)) {
        let expander = QueryExpander::default();
        let query = words.join(" ");
        let expanded = expander.expand_query(&query);
        for token in expander.tokenize(&query) {
            prop_assert!(expanded.contains(&token), "missing {token}");
        }
    }

    #[test]
    fn expansion_is_deterministic(query in "[a-zA-Z _-]{0,40}") {
        let expander = QueryExpander::default();
        prop_assert_eq!(expander.expand_query(&query), expander.expand_query(&query));
    }
}

#[test]
fn complexity_is_reexported() {
    assert_eq!(mnemo_query::detect_complexity("hi"), 1);
}
