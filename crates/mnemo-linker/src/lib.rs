// SPDX-FileCopyrightText: 2026 Mnemo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Relevance linking between tasks and memories.
//!
//! [`RelevanceEngine`] scores pairs; [`Linker`] turns scores above the
//! configured threshold into stored connections.

pub mod category;
pub mod link;
pub mod score;
pub mod technical;

pub use category::infer_category;
pub use link::{LinkSummary, Linker};
pub use score::{Profile, RelevanceEngine, RelevanceScore, ScoreBreakdown, classify};
pub use technical::technical_tokens;
