// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Query intelligence for Mnemo.
//!
//! Expands free-text queries through an injected [`Lexicon`] (synonyms,
//! acronyms, typo corrections, contextual phrases), measures fuzzy string
//! similarity, and ranks search results. The linking engine uses the same
//! expansion to make its scoring robust to vocabulary mismatch.

pub mod expand;
pub mod lexicon;
pub mod rank;
pub mod similarity;

pub use expand::{DEFAULT_FUZZY_THRESHOLD, QueryExpander};
pub use lexicon::Lexicon;
pub use mnemo_core::complexity::detect_complexity;
pub use rank::{Rankable, Ranked, rank_results};
pub use similarity::{jaccard, similarity};
